//! Content-negotiated delivery of artifact buffers.
//!
//! Picks an encoding from the request's `Accept-Encoding` header and streams
//! the buffer through the matching compressor into the response body. The
//! compressor runs on the blocking pool and hands chunks to the body through
//! a bounded channel, so the response never holds a second full copy.

use axum::{
    body::{Body, Bytes},
    http::{header, response, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

/// Size of input slices fed to the compressor.
const CHUNK_SIZE: usize = 16 * 1024;

/// Compressed chunks buffered between the compressor and the socket.
const CHANNEL_CHUNKS: usize = 8;

/// Transfer encodings the server can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Gzip,
    Deflate,
    Identity,
}

impl Encoding {
    /// Compressor for this encoding, `None` for identity.
    fn codec(&self) -> Option<Codec> {
        match self {
            Encoding::Gzip => Some(Codec::Gzip),
            Encoding::Deflate => Some(Codec::Deflate),
            Encoding::Identity => None,
        }
    }
}

/// Encodings that go through a compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Gzip,
    Deflate,
}

impl Codec {
    fn header_value(self) -> &'static str {
        match self {
            Codec::Gzip => "gzip",
            Codec::Deflate => "deflate",
        }
    }
}

/// Choose the encoding for a response from the request headers.
///
/// Quality values are honoured. Ties go to gzip, then deflate, then identity,
/// and identity stays acceptable unless the client sends `identity;q=0`
/// (or `*;q=0` without naming it).
pub fn negotiate(headers: &HeaderMap) -> Encoding {
    let mut gzip = None;
    let mut deflate = None;
    let mut identity = None;
    let mut wildcard = None;

    for value in headers.get_all(header::ACCEPT_ENCODING) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for item in value.split(',') {
            let mut parts = item.split(';');
            let name = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
            // A q parameter that does not parse disables the coding.
            let quality = match parts.find_map(|param| param.trim().strip_prefix("q=")) {
                Some(q) => q.trim().parse::<f32>().unwrap_or(0.0),
                None => 1.0,
            };

            match name.as_str() {
                "gzip" | "x-gzip" => gzip = Some(quality),
                "deflate" => deflate = Some(quality),
                "identity" => identity = Some(quality),
                "*" => wildcard = Some(quality),
                _ => {}
            }
        }
    }

    let gzip = gzip.or(wildcard).unwrap_or(0.0);
    let deflate = deflate.or(wildcard).unwrap_or(0.0);
    let identity = identity.or(wildcard).unwrap_or(1.0);

    [
        (Encoding::Gzip, gzip),
        (Encoding::Deflate, deflate),
        (Encoding::Identity, identity),
    ]
    .into_iter()
    .filter(|(_, q)| *q > 0.0)
    .fold(None, |best: Option<(Encoding, f32)>, candidate| match best {
        Some((_, q)) if q >= candidate.1 => best,
        _ => Some(candidate),
    })
    .map(|(encoding, _)| encoding)
    .unwrap_or(Encoding::Identity)
}

/// Send `buffer` with the negotiated encoding.
///
/// `response` carries whatever status and headers the caller already set.
pub fn deliver(buffer: Bytes, request_headers: &HeaderMap, response: response::Builder) -> Response {
    let encoding = negotiate(request_headers);
    tracing::trace!("delivering {} bytes as {:?}", buffer.len(), encoding);

    let response = response.header(header::VARY, HeaderValue::from_static("accept-encoding"));
    let result = match encoding.codec() {
        None => response.body(Body::from(buffer)),
        Some(codec) => response
            .header(header::CONTENT_ENCODING, codec.header_value())
            .body(compress_stream(buffer, codec)),
    };

    result.unwrap_or_else(|e| {
        tracing::error!("failed to build response: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

/// Body that yields `buffer` compressed with `codec`.
fn compress_stream(buffer: Bytes, codec: Codec) -> Body {
    let (rx, _task) = spawn_compressor(buffer, codec);
    body_from_channel(rx)
}

/// Compress `buffer` on the blocking pool, sending chunks to the receiver.
///
/// A compressor failure is sent as a final error item. When the receiver is
/// dropped the next write fails and the task ends.
fn spawn_compressor(buffer: Bytes, codec: Codec) -> (mpsc::Receiver<io::Result<Bytes>>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(CHANNEL_CHUNKS);
    let sink = ChannelWriter { tx: tx.clone() };

    let task = tokio::task::spawn_blocking(move || {
        let result = match codec {
            Codec::Gzip => {
                let mut encoder = GzEncoder::new(sink, Compression::default());
                write_chunks(&mut encoder, &buffer).and_then(|_| encoder.finish().map(drop))
            }
            Codec::Deflate => {
                let mut encoder = DeflateEncoder::new(sink, Compression::default());
                write_chunks(&mut encoder, &buffer).and_then(|_| encoder.finish().map(drop))
            }
        };

        if let Err(e) = result {
            tracing::debug!("compression stream ended early: {}", e);
            let _ = tx.blocking_send(Err(e));
        }
    });

    (rx, task)
}

/// Response body fed from the compressor channel. An error item aborts the
/// body, so the connection closes instead of hanging.
fn body_from_channel(rx: mpsc::Receiver<io::Result<Bytes>>) -> Body {
    Body::from_stream(ReceiverStream::new(rx))
}

fn write_chunks(writer: &mut impl Write, buffer: &[u8]) -> io::Result<()> {
    for chunk in buffer.chunks(CHUNK_SIZE) {
        writer.write_all(chunk)?;
    }
    writer.flush()
}

/// `Write` adapter forwarding every write as one body chunk.
struct ChannelWriter {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx
            .blocking_send(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response body dropped"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Gzipped length of `buffer` at maximum compression.
///
/// Used for the size column of the status display, not for delivery.
pub fn gzip_size(buffer: &[u8]) -> io::Result<u64> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(buffer)?;
    Ok(encoder.finish()?.len() as u64)
}
