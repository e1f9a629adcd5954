// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use agrihub_app::{
    AssessmentFailure, AssessmentReply, ChatEndpoint, ChatFailure, ChatReply, ChatRequest, Crop,
    CropColumn, CropId, DEMO_SOIL_MESSAGE, Generation, PredictionPayload, SampleProfile,
    SoilReading, reference_crops,
};
use agrihub_client::Client;
use agrihub_tui::{AppRuntime, InternalEvent};
use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

/// Runtime backed by a live agrihub server.
pub struct HttpRuntime {
    client: Client,
    endpoint: ChatEndpoint,
    typing_delay: Duration,
    prediction: Option<String>,
}

impl HttpRuntime {
    pub fn new(
        client: Client,
        endpoint: ChatEndpoint,
        typing_delay: Duration,
        prediction: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint,
            typing_delay,
            prediction,
        }
    }
}

fn fetch_catalogue(client: &Client) -> Result<Vec<Crop>> {
    client
        .list_crops()
        .with_context(|| format!("load crop catalogue from {}", client.base_url()))
}

/// Fetch the comparison and return it in `ids` order.
fn fetch_comparison(client: &Client, ids: &[CropId]) -> Result<Vec<Crop>> {
    let compared = client
        .compare_crops(ids)
        .context("fetch crop comparison")?;
    Ok(ids
        .iter()
        .filter_map(|id| compared.iter().find(|crop| crop.id == *id))
        .cloned()
        .collect())
}

impl AppRuntime for HttpRuntime {
    fn load_crops(&mut self) -> Result<Vec<Crop>> {
        fetch_catalogue(&self.client)
    }

    fn ask(&mut self, message: &str) -> ChatReply {
        self.client
            .ask(self.endpoint, message)
            .map_err(ChatFailure::from)
    }

    fn assess_soil(&mut self, reading: &SoilReading) -> AssessmentReply {
        self.client
            .predict(reading)
            .map_err(AssessmentFailure::from)
    }

    fn compare_crops(&mut self, checked: &[&Crop]) -> Result<Vec<Crop>> {
        let ids: Vec<CropId> = checked.iter().map(|crop| crop.id).collect();
        fetch_comparison(&self.client, &ids)
    }

    fn prediction_attribute(&mut self) -> Option<String> {
        self.prediction.clone()
    }

    fn spawn_chat(&mut self, request: ChatRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        let endpoint = self.endpoint;
        spawn_worker("agrihub-chat", self.typing_delay, tx, move || {
            let reply = client.ask(endpoint, &request.message).map_err(ChatFailure::from);
            InternalEvent::ChatReply {
                generation: request.generation,
                reply,
            }
        })
    }

    fn spawn_assessment(
        &mut self,
        generation: Generation,
        reading: SoilReading,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        spawn_worker("agrihub-soil", Duration::ZERO, tx, move || {
            let reply = client.predict(&reading).map_err(AssessmentFailure::from);
            InternalEvent::SoilAssessed { generation, reply }
        })
    }

    fn spawn_load_crops(&mut self, token: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        spawn_worker("agrihub-catalogue", Duration::ZERO, tx, move || {
            let crops = fetch_catalogue(&client).map_err(|error| format!("{error:#}"));
            InternalEvent::CropsLoaded { token, crops }
        })
    }

    fn spawn_compare(
        &mut self,
        token: u64,
        checked: Vec<Crop>,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let client = self.client.clone();
        let ids: Vec<CropId> = checked.iter().map(|crop| crop.id).collect();
        spawn_worker("agrihub-compare", Duration::ZERO, tx, move || {
            let crops = fetch_comparison(&client, &ids).map_err(|error| format!("{error:#}"));
            InternalEvent::CropsCompared { token, crops }
        })
    }
}

/// Offline runtime over the reference catalogue and recorded soil results
/// for the sample profiles.
pub struct DemoRuntime {
    crops: Vec<Crop>,
    typing_delay: Duration,
    prediction: Option<String>,
}

impl DemoRuntime {
    pub fn new(typing_delay: Duration, prediction: Option<String>) -> Self {
        Self {
            crops: reference_crops(),
            typing_delay,
            prediction,
        }
    }
}

impl AppRuntime for DemoRuntime {
    fn load_crops(&mut self) -> Result<Vec<Crop>> {
        Ok(self.crops.clone())
    }

    fn ask(&mut self, message: &str) -> ChatReply {
        Ok(demo_reply(&self.crops, message))
    }

    fn assess_soil(&mut self, reading: &SoilReading) -> AssessmentReply {
        SampleProfile::matching(reading)
            .map(SampleProfile::demo_assessment)
            .ok_or_else(|| AssessmentFailure::Rejected(DEMO_SOIL_MESSAGE.to_owned()))
    }

    fn prediction(&mut self) -> Option<PredictionPayload> {
        if self.prediction.is_some() {
            return None;
        }
        Some(PredictionPayload {
            base_yield: Some(2_000.0),
            yield_per_acre: Some(2_450.0),
            crop_name: Some("Rice".to_owned()),
        })
    }

    fn prediction_attribute(&mut self) -> Option<String> {
        self.prediction.clone()
    }

    fn spawn_chat(&mut self, request: ChatRequest, tx: Sender<InternalEvent>) -> Result<()> {
        let reply = self.ask(&request.message);
        spawn_worker("agrihub-chat", self.typing_delay, tx, move || {
            InternalEvent::ChatReply {
                generation: request.generation,
                reply,
            }
        })
    }
}

/// Run `job` on a named worker thread and deliver its event no sooner than
/// `min_delay` after the job started.
fn spawn_worker<F>(name: &str, min_delay: Duration, tx: Sender<InternalEvent>, job: F) -> Result<()>
where
    F: FnOnce() -> InternalEvent + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let started = Instant::now();
            let event = job();
            let remaining = min_delay.saturating_sub(started.elapsed());
            if !remaining.is_zero() {
                thread::sleep(remaining);
            }
            if tx.send(event).is_err() {
                tracing::debug!("ui closed before worker finished");
            }
        })
        .with_context(|| format!("spawn {name} worker thread"))?;
    Ok(())
}

fn demo_reply(crops: &[Crop], message: &str) -> String {
    let lower = message.to_lowercase();
    if let Some(crop) = crops
        .iter()
        .find(|crop| lower.contains(&crop.name.to_lowercase()))
    {
        return format!(
            "{} is a {} crop ready in {}. On {} soil it returns {} profit per acre ({} ROI).",
            crop.name,
            crop.suitable_season,
            CropColumn::Period.display(crop),
            crop.soil_type,
            CropColumn::Profit.display(crop),
            CropColumn::Roi.display(crop),
        );
    }
    "The assistant is offline in demo mode. Ask about a crop by name, for example rice or wheat."
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::{DemoRuntime, HttpRuntime, demo_reply};
    use agrihub_app::{
        ChatEndpoint, ChatRequest, DEMO_SOIL_MESSAGE, Generation, SampleProfile, reference_crops,
    };
    use agrihub_client::Client;
    use agrihub_tui::{AppRuntime, InternalEvent};
    use anyhow::{Result, anyhow};
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};
    use tiny_http::{Header, Response, Server};

    fn json_header() -> Header {
        Header::from_bytes("Content-Type", "application/json").expect("valid content type header")
    }

    fn mock_server() -> Result<(Server, String)> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        Ok((server, addr))
    }

    #[test]
    fn demo_runtime_serves_catalogue_and_recorded_soil_results() -> Result<()> {
        let mut runtime = DemoRuntime::new(Duration::ZERO, None);
        let crops = runtime.load_crops()?;
        assert_eq!(crops.len(), 10);

        for profile in SampleProfile::ALL {
            let assessment = runtime
                .assess_soil(&profile.reading())
                .map_err(|failure| anyhow!(failure.user_message()))?;
            assert_eq!(assessment, profile.demo_assessment());
        }
        assert!(runtime.prediction().is_some());
        Ok(())
    }

    #[test]
    fn demo_runtime_does_not_score_edited_readings() {
        let mut runtime = DemoRuntime::new(Duration::ZERO, None);
        let mut reading = SampleProfile::Medium.reading();
        reading.nitrogen = 46.0;
        let failure = runtime
            .assess_soil(&reading)
            .expect_err("edited reading has no recorded result");
        assert_eq!(failure.user_message(), format!("Error: {DEMO_SOIL_MESSAGE}"));
    }

    #[test]
    fn demo_prediction_flag_replaces_in_memory_payload() {
        let mut runtime = DemoRuntime::new(Duration::ZERO, Some("{\"base_yield\":1}".to_owned()));
        assert!(runtime.prediction().is_none());
        assert_eq!(
            runtime.prediction_attribute().as_deref(),
            Some("{\"base_yield\":1}")
        );
    }

    #[test]
    fn demo_reply_mentions_named_crop() {
        let crops = reference_crops();
        let reply = demo_reply(&crops, "Tell me about RICE please");
        assert!(reply.starts_with("Rice is a Kharif crop"), "{reply}");
        assert!(reply.contains("₹15,000"), "{reply}");

        let fallback = demo_reply(&crops, "hello");
        assert!(fallback.contains("demo mode"));
    }

    #[test]
    fn typing_delay_holds_reply_back() -> Result<()> {
        let mut runtime = DemoRuntime::new(Duration::from_millis(150), None);
        let (tx, rx) = mpsc::channel();
        let started = Instant::now();
        runtime.spawn_chat(
            ChatRequest {
                generation: Generation::default().next(),
                message: "wheat".to_owned(),
            },
            tx,
        )?;

        let event = rx.recv_timeout(Duration::from_secs(2))?;
        assert!(started.elapsed() >= Duration::from_millis(150));
        match event {
            InternalEvent::ChatReply { reply, .. } => {
                assert!(reply.map_err(|failure| anyhow!(failure.user_message()))?.starts_with("Wheat"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn http_runtime_chat_worker_reports_reply() -> Result<()> {
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/ask");
            let response = Response::from_string(r#"{"response":"Plant mustard in rabi."}"#)
                .with_header(json_header());
            request.respond(response).expect("response should succeed");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = HttpRuntime::new(client, ChatEndpoint::Ask, Duration::ZERO, None);
        let (tx, rx) = mpsc::channel();
        let generation = Generation::default().next();
        runtime.spawn_chat(
            ChatRequest {
                generation,
                message: "what now?".to_owned(),
            },
            tx,
        )?;

        let event = rx.recv_timeout(Duration::from_secs(2))?;
        assert_eq!(
            event,
            InternalEvent::ChatReply {
                generation,
                reply: Ok("Plant mustard in rabi.".to_owned()),
            }
        );
        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn http_runtime_compare_keeps_checked_order() -> Result<()> {
        let crops = reference_crops();
        let body = agrihub_testkit::crops_json(&[crops[0].clone(), crops[2].clone()])?;
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/api/compare?crop_ids=3&crop_ids=1");
            request
                .respond(Response::from_string(body).with_header(json_header()))
                .expect("response should succeed");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = HttpRuntime::new(client, ChatEndpoint::Ask, Duration::ZERO, None);
        let compared = runtime.compare_crops(&[&crops[2], &crops[0]])?;
        let names: Vec<&str> = compared.iter().map(|crop| crop.name.as_str()).collect();
        assert_eq!(names, vec!["Cotton", "Rice"]);

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn http_runtime_loads_catalogue_on_worker() -> Result<()> {
        let body = agrihub_testkit::crops_json(&reference_crops()[..2])?;
        let (server, addr) = mock_server()?;
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert_eq!(request.url(), "/api/crops");
            request
                .respond(Response::from_string(body).with_header(json_header()))
                .expect("response should succeed");
        });

        let client = Client::new(&addr, Duration::from_secs(1))?;
        let mut runtime = HttpRuntime::new(client, ChatEndpoint::Ask, Duration::ZERO, None);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_load_crops(7, tx)?;

        match rx.recv_timeout(Duration::from_secs(2))? {
            InternalEvent::CropsLoaded { token, crops } => {
                assert_eq!(token, 7);
                let names: Vec<String> = crops
                    .map_err(|error| anyhow!(error))?
                    .into_iter()
                    .map(|crop| crop.name)
                    .collect();
                assert_eq!(names, vec!["Rice", "Wheat"]);
            }
            other => panic!("unexpected event {other:?}"),
        }
        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn http_runtime_compare_worker_reports_failure() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))?;
        let mut runtime = HttpRuntime::new(client, ChatEndpoint::Ask, Duration::ZERO, None);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_compare(3, reference_crops()[..1].to_vec(), tx)?;

        match rx.recv_timeout(Duration::from_secs(2))? {
            InternalEvent::CropsCompared { token, crops } => {
                assert_eq!(token, 3);
                let error = crops.expect_err("unreachable server");
                assert!(error.contains("fetch crop comparison"), "{error}");
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn http_runtime_load_failure_names_server() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1", Duration::from_millis(50))?;
        let mut runtime = HttpRuntime::new(client, ChatEndpoint::Ask, Duration::ZERO, None);
        let error = runtime.load_crops().expect_err("unreachable server");
        assert!(format!("{error:#}").contains("http://127.0.0.1:1"));
        Ok(())
    }
}
