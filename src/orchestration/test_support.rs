//! In-memory broker used by the orchestration tests

use crate::core::error::PublishError;
use crate::core::traits::{BrokerClient, BrokerResponse};
use async_trait::async_trait;
use std::sync::Mutex;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub url: String,
    pub body: Vec<u8>,
}

/// Answers publish and tag calls with fixed responses and records every request
pub(crate) struct FakeBroker {
    publish: Result<BrokerResponse, String>,
    tag: Result<BrokerResponse, String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn response(status: u16, reason: &str, body: &str) -> BrokerResponse {
    BrokerResponse {
        status,
        reason: Some(reason.to_string()),
        body: body.to_string(),
    }
}

impl FakeBroker {
    pub fn accepting() -> Self {
        Self {
            publish: Ok(response(201, "Created", "{}")),
            tag: Ok(response(201, "Created", "{}")),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(status: u16, reason: &str, body: &str) -> Self {
        Self {
            publish: Ok(response(status, reason, body)),
            ..Self::accepting()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            publish: Err("connection refused".to_string()),
            ..Self::accepting()
        }
    }

    pub fn clear_publish_reason(&mut self) {
        if let Ok(response) = &mut self.publish {
            response.reason = None;
        }
    }

    pub fn with_tag_status(mut self, status: u16) -> Self {
        self.tag = Ok(response(status, "Tag Response", "tag error"));
        self
    }

    pub fn with_tag_unreachable(mut self) -> Self {
        self.tag = Err("connection reset".to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl BrokerClient for FakeBroker {
    async fn put_json(&self, url: &Url, body: Vec<u8>) -> Result<BrokerResponse, PublishError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            body,
        });

        let is_tag_call = url.path_segments().and_then(|mut s| s.next()) == Some("pacticipants");
        let planned = if is_tag_call {
            &self.tag
        } else {
            &self.publish
        };

        planned.clone().map_err(|message| PublishError::Transport {
            url: url.to_string(),
            message,
        })
    }
}
