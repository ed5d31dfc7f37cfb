//! Copy one sample into Holmes-Storage: metadata, request, send, log the answer.

use chrono::{DateTime, Local, SecondsFormat, TimeZone};
use log::{error, info};
use reqwest::blocking::Client;
use thiserror::Error;

use crate::engine::request::{RequestError, SampleOrigin, build_request};
use crate::engine::tools::reference_basename;
use crate::{SubmissionMeta, UploadOpts, UploadOutcome};

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("upload {uri}: {source}")]
    Send {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("read response from {uri}: {source}")]
    Response {
        uri: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Fresh blocking client for one upload. `insecure` disables certificate validation.
pub fn http_client(opts: &UploadOpts) -> reqwest::Result<Client> {
    Client::builder()
        .danger_accept_invalid_certs(opts.insecure)
        .timeout(opts.timeout)
        .build()
}

/// RFC 3339 timestamp with second precision; `Z` when the offset is zero.
pub fn format_date<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Metadata for one upload: configured fields plus the reference's basename and the current time.
pub fn submission_meta(opts: &UploadOpts, reference: &str) -> SubmissionMeta {
    SubmissionMeta {
        user_id: opts.user_id.clone(),
        source: opts.source.clone(),
        name: reference_basename(reference),
        date: format_date(&Local::now()),
        comment: opts.comment.clone(),
    }
}

/// Upload `reference` and return `(status, body)` of the storage answer.
pub fn try_copy_sample(opts: &UploadOpts, reference: &str) -> Result<(u16, String), CopyError> {
    let meta = submission_meta(opts, reference);
    let client = http_client(opts).map_err(CopyError::Client)?;
    let request = build_request(&client, opts, &meta.to_fields(), reference)?;
    if let SampleOrigin::FileServer { id } = &request.origin {
        info!("{}: fetched from CFS as {}", reference, id);
    }
    let uri = request.uri.clone();
    let resp = request.send(&client).map_err(|source| CopyError::Send {
        uri: uri.clone(),
        source,
    })?;
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .map_err(|source| CopyError::Response { uri, source })?;
    Ok((status, body))
}

/// Upload `reference`, log the result and report it as an [`UploadOutcome`].
pub fn copy_sample(opts: &UploadOpts, reference: &str) -> UploadOutcome {
    match try_copy_sample(opts, reference) {
        Ok((status, body)) => {
            info!("Uploaded {}", reference);
            info!("{}", status);
            info!("{}", body);
            info!("-------------------------------------------");
            UploadOutcome::Uploaded {
                reference: reference.to_string(),
                status,
                body,
            }
        }
        Err(e) => {
            error!("{}: {}", reference, e);
            UploadOutcome::Failed {
                reference: reference.to_string(),
                error: e.to_string(),
            }
        }
    }
}
