use nsgcli::error::ApiError;
use nsgcli::response::{render_replies, StatusMode};
use nsgcli::transport::RawResponse;
use std::io::{self, BufRead, BufReader, Read};

const EXEC_STREAM: &str = "[{\"agent\":\"a1\",\"agentAddress\":\"10.0.0.1\",\"response\":[\"10.1.1.1 is alive\"],\"exitStatus\":0}\n\
{\"agent\":\"a2\",\"agentAddress\":\"10.0.0.2\",\"response\":[\"10.1.1.1 is unreachable\"],\"exitStatus\":1}\n\
{\"error\":\"agent a3 did not answer\"}\n\
]\n";

#[test]
fn fping_replies_render_in_stream_order() {
    let raw = RawResponse::new(200, Some("application/json".to_string()), EXEC_STREAM.as_bytes());
    let mut decoder = raw.decoder();
    let out = render_replies(decoder.by_ref(), StatusMode::Fping);
    let stats = decoder.finish().unwrap();
    assert_eq!(stats.parsed, 3);
    assert_eq!(stats.malformed, 0);

    let a1 = out.find("Source: a1 (10.0.0.1)").unwrap();
    let a2 = out.find("Source: a2 (10.0.0.2)").unwrap();
    assert!(a1 < a2);
    assert!(out.contains("Status: ok\nOutput: \n10.1.1.1 is alive\n"));
    assert!(out.contains("Status: some hosts were unreachable\n"));
    assert!(out.ends_with("ERROR: agent a3 did not answer\n"));
}

#[test]
fn generic_mode_falls_back_to_unknown_error() {
    let raw = RawResponse::new(200, None, EXEC_STREAM.as_bytes());
    let out = render_replies(raw.decoder(), StatusMode::Generic);
    assert!(out.contains("Status: unknown error\n"));
}

#[test]
fn failure_status_becomes_status_error() {
    let body = "[{\"error\":\"network 42 does not exist\"}\n]\n";
    let raw = RawResponse::new(404, None, body.as_bytes());
    let err = raw.into_stream_envelope().into_result().unwrap_err();
    match err {
        ApiError::Status { code, message } => {
            assert_eq!(code, 404);
            assert_eq!(message, "network 42 does not exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn plain_text_error_body_is_used_verbatim() {
    let raw = RawResponse::new(503, Some("text/plain".to_string()), "Service Unavailable\n".as_bytes());
    let env = raw.into_document_envelope();
    assert_eq!(env.error(), Some("Service Unavailable"));
}

/// Yields its first line, then fails every read after that.
struct OneLineThenBroken {
    first: Option<&'static [u8]>,
}

impl Read for OneLineThenBroken {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.first.take() {
            Some(bytes) => {
                buf[..bytes.len()].copy_from_slice(bytes);
                Ok(bytes.len())
            }
            None => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        }
    }
}

#[test]
fn decoder_reads_only_as_far_as_the_caller_pulls() {
    let reader = BufReader::new(OneLineThenBroken {
        first: Some(b"[{\"agent\":\"a1\",\"exitStatus\":0}\n"),
    });
    let raw = RawResponse::new(200, None, reader);
    let mut decoder = raw.decoder();
    let first = decoder.next().unwrap();
    assert_eq!(first["agent"], "a1");
}

#[test]
fn broken_stream_is_reported_by_finish() {
    let reader = BufReader::new(OneLineThenBroken {
        first: Some(b"[{\"agent\":\"a1\",\"exitStatus\":0}\n"),
    });
    let mut decoder = RawResponse::new(200, None, reader).decoder();
    let values: Vec<_> = decoder.by_ref().collect();
    assert_eq!(values.len(), 1);
    assert!(matches!(decoder.finish(), Err(ApiError::Io(_))));
}

#[test]
fn body_can_be_taken_back_unread() {
    let raw = RawResponse::new(200, None, "line one\nline two\n".as_bytes());
    let lines: Vec<String> = raw.into_body().lines().map(|l| l.unwrap()).collect();
    assert_eq!(lines, vec!["line one", "line two"]);
}
