//! Request descriptions handed to a [`crate::transport::Transport`].
//!
//! Endpoints describe *what* to fetch as a [`PlayRequest`]; the transport
//! decides how. Base URL and locale always come from an explicit
//! [`RequestContext`], never from process-wide state.

use gplay_core::{AppConfig, Locale};
use serde_json::{json, Value};

use crate::error::ScraperError;

const BATCH_PATH: &str = "/_/PlayStoreUi/data/batchexecute";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    /// Form-encoded POST.
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    pub method: Method,
    pub url: String,
    /// Form fields for [`Method::Post`]; empty for GET.
    pub form: Vec<(String, String)>,
}

impl PlayRequest {
    /// Value of the named form field, if any.
    #[must_use]
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Where to send requests and in which locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Scheme and host without a trailing slash, e.g. `https://play.google.com`.
    pub base_url: String,
    pub locale: Locale,
}

impl RequestContext {
    #[must_use]
    pub fn new(base_url: impl Into<String>, locale: Locale) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            locale,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.base_url.clone(), config.locale.clone())
    }

    /// Same host, different locale.
    #[must_use]
    pub fn with_locale(&self, locale: Locale) -> Self {
        Self {
            base_url: self.base_url.clone(),
            locale,
        }
    }

    /// GET `{base}{path}?{params}&hl=…&gl=…` with every value URL-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidRequest`] if the base URL does not
    /// parse.
    pub fn page(&self, path: &str, params: &[(&str, &str)]) -> Result<PlayRequest, ScraperError> {
        let url = self.url(path, params)?;
        Ok(PlayRequest {
            method: Method::Get,
            url,
            form: Vec::new(),
        })
    }

    /// POST to the batch RPC endpoint for `rpc_id`.
    ///
    /// `inner` is the RPC's own argument array; it is serialised to a string
    /// and wrapped as `[[[rpc_id, "<inner>", null, tag]]]` in the `f.req`
    /// form field.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidRequest`] if the base URL does not
    /// parse.
    pub fn batch(
        &self,
        rpc_id: &str,
        inner: &Value,
        tag: &str,
    ) -> Result<PlayRequest, ScraperError> {
        let url = self.url(BATCH_PATH, &[("rpcids", rpc_id)])?;
        let envelope = json!([[[rpc_id, inner.to_string(), Value::Null, tag]]]);
        Ok(PlayRequest {
            method: Method::Post,
            url,
            form: vec![("f.req".to_owned(), envelope.to_string())],
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<String, ScraperError> {
        let locale = [
            ("hl", self.locale.language.as_str()),
            ("gl", self.locale.country.as_str()),
        ];
        reqwest::Url::parse_with_params(
            &format!("{}{path}", self.base_url),
            params.iter().chain(locale.iter()),
        )
        .map(String::from)
        .map_err(|e| ScraperError::InvalidRequest {
            reason: format!("cannot build URL from base {}: {e}", self.base_url),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new("https://play.google.com/", Locale::new("de", "at"))
    }

    #[test]
    fn page_url_encodes_params_and_appends_locale() {
        let req = ctx().page("/store/search", &[("q", "maps & más"), ("c", "apps")]).unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(
            req.url,
            "https://play.google.com/store/search?q=maps+%26+m%C3%A1s&c=apps&hl=de&gl=at"
        );
        assert!(req.form.is_empty());
    }

    #[test]
    fn batch_wraps_inner_payload_as_string() {
        let inner = json!([[null, ["com.example", 7], []]]);
        let req = ctx().batch("xdSrCf", &inner, "1").unwrap();
        assert_eq!(req.method, Method::Post);
        assert!(req.url.starts_with(
            "https://play.google.com/_/PlayStoreUi/data/batchexecute?rpcids=xdSrCf&hl=de&gl=at"
        ));
        let f_req: Value = serde_json::from_str(req.form_value("f.req").unwrap()).unwrap();
        assert_eq!(f_req[0][0][0], "xdSrCf");
        assert_eq!(f_req[0][0][1], inner.to_string());
        assert_eq!(f_req[0][0][3], "1");
    }

    #[test]
    fn unparseable_base_is_invalid_request() {
        let bad = RequestContext::new("not a url", Locale::default());
        assert!(matches!(
            bad.page("/store/apps/details", &[]),
            Err(ScraperError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn with_locale_keeps_host() {
        let other = ctx().with_locale(Locale::new("en", "gb"));
        assert_eq!(other.base_url, "https://play.google.com");
        assert_eq!(other.locale.country, "gb");
    }
}
