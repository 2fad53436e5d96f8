//! Finds and decodes the data literals embedded in a response body.
//!
//! A body can carry several candidate literals (script islands, batch
//! frames). [`Page::locate`] lists them in document order without decoding;
//! [`select`] decodes them lazily and returns the first one whose structure
//! satisfies the endpoint's [`Shape`]. Positions of literals are always
//! found by scanning, never by fixed offsets.

mod batch;
mod islands;
pub(crate) mod scan;
pub mod shape;

use std::borrow::Cow;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{MalformedReason, ScraperError};

pub use shape::{Expect, Shape};

/// Which kind of embedded literal to look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `AF_initDataCallback({key: 'ds:N', data: …})` blocks in an HTML page.
    CallbackIslands,
    /// `NAME = <literal>` assignments in inline script.
    Assignment(&'static str),
    /// `wrb.fr` frames of a batch RPC response for one RPC id.
    BatchFrames { rpc_id: &'static str },
}

/// One embedded literal, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Zero-based position among the candidates of the same page.
    pub order: usize,
    /// Island key (`ds:5`), frame tag or assignment name, when present.
    pub key: Option<String>,
    /// Raw literal text; `None` when the literal never closed or the
    /// frame carried no payload.
    pub literal: Option<Cow<'a, str>>,
    /// A batch frame that answered with a null payload: the store had
    /// nothing to return for the request.
    pub empty: bool,
}

impl Candidate<'_> {
    pub(crate) fn unterminated(order: usize, key: Option<String>) -> Self {
        Self {
            order,
            key,
            literal: None,
            empty: false,
        }
    }

    /// Parses the literal.
    ///
    /// # Errors
    ///
    /// Returns a short description when the frame had no payload, the
    /// literal is unterminated, or it is not valid JSON.
    pub fn decode(&self) -> Result<Value, String> {
        if self.empty {
            return Err("frame carried no payload".to_owned());
        }
        let literal = self
            .literal
            .as_deref()
            .ok_or_else(|| "unterminated literal".to_owned())?;
        serde_json::from_str(literal).map_err(|e| e.to_string())
    }
}

/// Returns the first decodable candidate whose structure matches `shape`.
///
/// # Errors
///
/// - [`MalformedReason::NoCandidates`] when `candidates` is empty.
/// - [`MalformedReason::Undecodable`] when no candidate decodes.
/// - [`MalformedReason::ShapeMismatch`] when some decode but none match.
pub fn select(candidates: &[Candidate<'_>], shape: &Shape) -> Result<Value, MalformedReason> {
    if candidates.is_empty() {
        return Err(MalformedReason::NoCandidates);
    }
    let mut failures = Vec::new();
    let mut decoded = 0usize;
    for candidate in candidates {
        match candidate.decode() {
            Ok(blob) if shape.matches(&blob) => return Ok(blob),
            Ok(_) => decoded += 1,
            Err(detail) => failures.push(detail),
        }
    }
    if decoded == 0 {
        Err(MalformedReason::Undecodable {
            count: failures.len(),
            detail: failures.first().cloned().unwrap_or_default(),
        })
    } else {
        Err(MalformedReason::ShapeMismatch {
            shape: shape.name,
            inspected: candidates.len(),
        })
    }
}

/// A response body together with what was being fetched, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Page<'a> {
    body: &'a str,
    context: &'a str,
}

impl<'a> Page<'a> {
    #[must_use]
    pub fn new(body: &'a str, context: &'a str) -> Self {
        Self { body, context }
    }

    /// First 16 hex digits of the body's SHA-256 plus its byte length, e.g.
    /// `3f1a9c0d52e8b7a4:48213`.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = format!("{:x}", Sha256::digest(self.body.as_bytes()));
        format!("{}:{}", &digest[..16], self.body.len())
    }

    #[must_use]
    pub fn locate(&self, selector: &Selector) -> Vec<Candidate<'a>> {
        match selector {
            Selector::CallbackIslands => islands::callback_islands(self.body),
            Selector::Assignment(name) => islands::assignments(self.body, name),
            Selector::BatchFrames { rpc_id } => batch::frames(self.body, rpc_id),
        }
    }

    /// Locates candidates with `selector` and returns the blob matching
    /// `shape`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MalformedPage`] carrying this page's
    /// fingerprint. A blank body is reported as
    /// [`MalformedReason::EmptyBody`] before any scanning.
    pub fn select(&self, selector: &Selector, shape: &Shape) -> Result<Value, ScraperError> {
        if self.body.trim().is_empty() {
            return Err(self.malformed(MalformedReason::EmptyBody));
        }
        let candidates = self.locate(selector);
        select(&candidates, shape).map_err(|reason| self.malformed(reason))
    }

    /// Batch-frame variant of [`Page::select`] for requests the store may
    /// answer with nothing.
    ///
    /// When every `rpc_id` frame carries a null payload the result is
    /// `Ok(None)`; list endpoints read that as an empty last page.
    ///
    /// # Errors
    ///
    /// As [`Page::select`], including when no frame for `rpc_id` exists.
    pub fn select_frames(
        &self,
        rpc_id: &'static str,
        shape: &Shape,
    ) -> Result<Option<Value>, ScraperError> {
        if self.body.trim().is_empty() {
            return Err(self.malformed(MalformedReason::EmptyBody));
        }
        let candidates = batch::frames(self.body, rpc_id);
        if !candidates.is_empty() && candidates.iter().all(|c| c.empty) {
            tracing::debug!(context = self.context, rpc_id, "batch frames carried no payload");
            return Ok(None);
        }
        select(&candidates, shape)
            .map(Some)
            .map_err(|reason| self.malformed(reason))
    }

    /// Builds a [`ScraperError::MalformedPage`] for this page and logs it.
    #[must_use]
    pub fn malformed(&self, reason: MalformedReason) -> ScraperError {
        let fingerprint = self.fingerprint();
        tracing::warn!(
            context = self.context,
            fingerprint = %fingerprint,
            reason = %reason,
            "malformed page"
        );
        ScraperError::MalformedPage {
            context: self.context.to_owned(),
            fingerprint,
            reason,
        }
    }
}
