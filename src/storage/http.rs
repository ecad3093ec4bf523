//! HTTP selection backend for WASM targets.
//!
//! Talks to `{base_url}/me/countries` using the browser's fetch API. The
//! body is `{"countries": ["UKR", ...]}` in both directions.

use super::{PersistenceError, SelectionBackend};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CountriesBody {
    #[serde(default)]
    countries: Vec<String>,
}

/// Selection backend backed by a REST endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/me/countries", self.base_url)
    }

    /// Sends a request and returns the response if it has a 2xx status.
    async fn send(&self, method: &str, body: Option<String>) -> Result<Response, String> {
        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_mode(RequestMode::Cors);
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }

        let request = Request::new_with_str_and_init(&self.endpoint(), &opts)
            .map_err(|e| format!("{:?}", e))?;
        request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| format!("{:?}", e))?;

        let window = web_sys::window().ok_or_else(|| "No window".to_string())?;
        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| format!("{:?}", e))?
            .dyn_into()
            .map_err(|_| "Fetch did not return a Response".to_string())?;

        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }
        Ok(response)
    }
}

impl SelectionBackend for HttpBackend {
    async fn fetch_selection(&self) -> Result<Vec<String>, PersistenceError> {
        let response = self.send("GET", None).await.map_err(PersistenceError::Fetch)?;

        let text = JsFuture::from(response.text().map_err(|e| PersistenceError::Fetch(format!("{:?}", e)))?)
            .await
            .map_err(|e| PersistenceError::Fetch(format!("{:?}", e)))?
            .as_string()
            .unwrap_or_default();

        let body: CountriesBody =
            serde_json::from_str(&text).map_err(|e| PersistenceError::Fetch(e.to_string()))?;
        log::info!("Fetched {} saved countries", body.countries.len());
        Ok(body.countries)
    }

    async fn save_selection(&self, codes: Vec<String>) -> Result<(), PersistenceError> {
        let body = serde_json::to_string(&CountriesBody { countries: codes })
            .map_err(|e| PersistenceError::Save(e.to_string()))?;
        self.send("PUT", Some(body))
            .await
            .map_err(PersistenceError::Save)?;
        Ok(())
    }
}
