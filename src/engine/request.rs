//! Holmes-Storage upload requests: resolve a sample reference to bytes and build the
//! buffered multipart `PUT`.
//!
//! Resolution order: local file first; otherwise the reference is decoded as a CRITs
//! document id and downloaded from the file server.

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use thiserror::Error;

use crate::UploadOpts;
use crate::engine::doc_id::{DocumentId, IdError};
use crate::utils::config::WireNames;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{reference}: not a readable local file and not a document id ({source})")]
    InvalidReference {
        reference: String,
        #[source]
        source: IdError,
    },
    #[error("{reference}: no CRITs file server configured for document {id}")]
    NoFileServer { reference: String, id: DocumentId },
    #[error("download failed: {url} returned {status}")]
    DownloadFailed { url: String, status: StatusCode },
    #[error("read {reference}")]
    Read {
        reference: String,
        #[source]
        source: io::Error,
    },
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
}

/// Where the sample bytes came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SampleOrigin {
    Local,
    FileServer { id: DocumentId },
}

/// Resolved sample content.
#[derive(Debug)]
pub struct SampleContent {
    pub origin: SampleOrigin,
    pub data: Vec<u8>,
}

/// A fully built upload: method is always `PUT`, body is fully buffered.
pub struct UploadRequest {
    pub uri: String,
    pub form: Form,
    pub origin: SampleOrigin,
}

impl UploadRequest {
    /// Send the request with `client`. The multipart boundary goes into `Content-Type`.
    pub fn send(self, client: &Client) -> reqwest::Result<Response> {
        client.put(&self.uri).multipart(self.form).send()
    }
}

/// Resolve `reference` to its bytes: local file, else CFS download by document id.
pub fn resolve_sample(
    client: &Client,
    opts: &UploadOpts,
    reference: &str,
) -> Result<SampleContent, RequestError> {
    match File::open(reference) {
        Ok(mut file) => {
            let mut data = Vec::new();
            file.read_to_end(&mut data)
                .map_err(|source| RequestError::Read {
                    reference: reference.to_string(),
                    source,
                })?;
            Ok(SampleContent {
                origin: SampleOrigin::Local,
                data,
            })
        }
        Err(open_err) => {
            debug!("{}: not a local file ({}), trying CFS", reference, open_err);
            let id = DocumentId::decode(reference).map_err(|source| {
                RequestError::InvalidReference {
                    reference: reference.to_string(),
                    source,
                }
            })?;
            let url = opts
                .cfs_download_url(&id.to_hex())
                .ok_or_else(|| RequestError::NoFileServer {
                    reference: reference.to_string(),
                    id,
                })?;
            let data = download_from_cfs(client, &url)?;
            Ok(SampleContent {
                origin: SampleOrigin::FileServer { id },
                data,
            })
        }
    }
}

/// GET `url` and return the body. Any status other than 200 is [`RequestError::DownloadFailed`].
/// The body is read to the end either way so the connection can be reused.
pub fn download_from_cfs(client: &Client, url: &str) -> Result<Vec<u8>, RequestError> {
    debug!("Downloading {}", url);
    let resp = client.get(url).send()?;
    let status = resp.status();
    let body = resp.bytes();
    if status != StatusCode::OK {
        return Err(RequestError::DownloadFailed {
            url: url.to_string(),
            status,
        });
    }
    Ok(body?.to_vec())
}

/// Build the multipart `PUT` of `reference` to the samples endpoint with the given form fields.
///
/// The file part is named `sample` and carries the reference verbatim as its filename
/// (no percent-encoding, so paths keep their `/`).
pub fn build_request(
    client: &Client,
    opts: &UploadOpts,
    fields: &BTreeMap<String, String>,
    reference: &str,
) -> Result<UploadRequest, RequestError> {
    let content = resolve_sample(client, opts, reference)?;
    let sample = Part::bytes(content.data)
        .file_name(reference.to_string())
        .mime_str(WireNames::SAMPLE_CONTENT_TYPE)?;
    let form = fields.iter().fold(
        Form::new()
            .percent_encode_noop()
            .part(WireNames::SAMPLE_FIELD, sample),
        |form, (key, value)| form.text(key.clone(), value.clone()),
    );
    Ok(UploadRequest {
        uri: opts.samples_endpoint(),
        form,
        origin: content.origin,
    })
}
