//! # Framing de Mensajes HTTP
//! src/http/framer.rs
//!
//! Lee un mensaje completo desde un stream cuyos límites no se conocen de
//! antemano:
//!
//! 1. Lee bloques de [`RECV_BUF`] bytes hasta ver `\r\n\r\n` (fin de headers).
//! 2. Los bytes que sobran después del terminador son el inicio del body.
//! 3. Si hay `Content-Length`, sigue leyendo hasta completar ese largo.
//!
//! Sin `Content-Length` el body es lo que ya se leyó junto con los headers y no
//! se intenta ninguna lectura adicional. Un body sin largo declarado que no
//! quepa en la primera lectura queda incompleto (limitación conocida del
//! protocolo simplificado).

use super::message::{Headers, Message, Method, StartLine};
use std::io::{self, Read};
use thiserror::Error;

/// Tamaño de cada lectura del socket
pub const RECV_BUF: usize = 4096;

/// Tamaño máximo del bloque de headers
pub const MAX_HEAD_BYTES: usize = 64 * 1024;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Errores de framing
#[derive(Debug, Error)]
pub enum FramingError {
    /// El peer cerró sin enviar ningún byte
    #[error("connection closed before any data was received")]
    Empty,

    /// El peer cerró antes de completar el bloque de headers
    #[error("header block terminator never arrived")]
    UnterminatedHead,

    #[error("header block exceeds {} bytes", MAX_HEAD_BYTES)]
    HeadTooLarge,

    #[error("header block is not valid UTF-8")]
    InvalidEncoding,

    #[error("invalid start line: {0:?}")]
    InvalidStartLine(String),

    #[error("invalid header line: {0:?}")]
    InvalidHeader(String),

    #[error("invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    /// El peer cerró antes de entregar todo el body declarado
    #[error("body truncated: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    #[error("connection error: {0}")]
    Connection(#[from] io::Error),
}

/// Qué tan lejos leer el body de una response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Completar el body según `Content-Length`
    Complete,

    /// Solo el bloque de headers (responses a HEAD); el body queda vacío
    HeadOnly,
}

/// Lee un request completo
pub fn read_request<R: Read>(stream: &mut R) -> Result<Message, FramingError> {
    let (head, rest) = read_head(stream)?;
    let (first, header_lines) = split_head(&head)?;
    let start_line = parse_request_line(first)?;
    frame(stream, start_line, header_lines, rest, BodyMode::Complete)
}

/// Lee una response completa (o solo sus headers, según `mode`)
pub fn read_response<R: Read>(stream: &mut R, mode: BodyMode) -> Result<Message, FramingError> {
    let (head, rest) = read_head(stream)?;
    let (first, header_lines) = split_head(&head)?;
    let start_line = parse_status_line(first)?;
    frame(stream, start_line, header_lines, rest, mode)
}

fn frame<R: Read>(
    stream: &mut R,
    start_line: StartLine,
    header_lines: Vec<&str>,
    rest: Vec<u8>,
    mode: BodyMode,
) -> Result<Message, FramingError> {
    let headers = parse_headers(&header_lines)?;

    let body = match mode {
        BodyMode::HeadOnly => Vec::new(),
        BodyMode::Complete => match headers.get("Content-Length") {
            Some(raw) => {
                let expected = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| FramingError::InvalidContentLength(raw.to_string()))?;
                read_body(stream, rest, expected)?
            }
            None => rest,
        },
    };

    Ok(Message {
        start_line,
        headers,
        body,
    })
}

/// Lee hasta encontrar el terminador de headers
///
/// Retorna (bloque de headers sin terminador, bytes sobrantes)
fn read_head<R: Read>(stream: &mut R) -> Result<(Vec<u8>, Vec<u8>), FramingError> {
    let mut buffer = Vec::with_capacity(RECV_BUF);
    let mut chunk = [0u8; RECV_BUF];

    loop {
        let n = read_chunk(stream, &mut chunk)?;
        if n == 0 {
            return Err(if buffer.is_empty() {
                FramingError::Empty
            } else {
                FramingError::UnterminatedHead
            });
        }

        // El terminador puede haber quedado partido entre dos lecturas
        let search_from = buffer.len().saturating_sub(HEAD_TERMINATOR.len() - 1);
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(pos) = find_terminator(&buffer[search_from..]) {
            let end = search_from + pos;
            let rest = buffer.split_off(end + HEAD_TERMINATOR.len());
            buffer.truncate(end);
            return Ok((buffer, rest));
        }

        if buffer.len() > MAX_HEAD_BYTES {
            return Err(FramingError::HeadTooLarge);
        }
    }
}

fn read_body<R: Read>(
    stream: &mut R,
    mut body: Vec<u8>,
    expected: usize,
) -> Result<Vec<u8>, FramingError> {
    let mut chunk = [0u8; RECV_BUF];

    while body.len() < expected {
        let n = read_chunk(stream, &mut chunk)?;
        if n == 0 {
            return Err(FramingError::TruncatedBody {
                expected,
                received: body.len(),
            });
        }
        body.extend_from_slice(&chunk[..n]);
    }

    // Sin pipelining: lo que exceda el largo declarado no pertenece al mensaje
    body.truncate(expected);
    Ok(body)
}

fn read_chunk<R: Read>(stream: &mut R, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(chunk) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn find_terminator(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
}

fn split_head(head: &[u8]) -> Result<(&str, Vec<&str>), FramingError> {
    let text = std::str::from_utf8(head).map_err(|_| FramingError::InvalidEncoding)?;
    let mut lines = text.split("\r\n");
    let first = lines.next().unwrap_or_default();
    Ok((first, lines.collect()))
}

/// Formato: `GET /path HTTP/1.1`, exactamente tres tokens
fn parse_request_line(line: &str) -> Result<StartLine, FramingError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        [method, target, version] => Ok(StartLine::Request {
            method: Method::from(*method),
            target: target.to_string(),
            version: version.to_string(),
        }),
        _ => Err(FramingError::InvalidStartLine(line.to_string())),
    }
}

/// Formato: `HTTP/1.1 404 Not Found`; la razón puede contener espacios
fn parse_status_line(line: &str) -> Result<StartLine, FramingError> {
    let invalid = || FramingError::InvalidStartLine(line.to_string());

    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let version = parts.next().filter(|v| !v.is_empty()).ok_or_else(invalid)?;
    let status = parts
        .next()
        .and_then(|s| s.parse::<u16>().ok())
        .ok_or_else(invalid)?;
    let reason = parts.next().map(str::trim).filter(|r| !r.is_empty()).ok_or_else(invalid)?;

    Ok(StartLine::Status {
        version: version.to_string(),
        status,
        reason: reason.to_string(),
    })
}

/// Cada header tiene formato `Name: Value`
fn parse_headers(lines: &[&str]) -> Result<Headers, FramingError> {
    let mut headers = Headers::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                headers.append(name.trim(), value.trim());
            }
            _ => return Err(FramingError::InvalidHeader(line.to_string())),
        }
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader que entrega los datos en trozos de tamaño fijo
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        reads: usize,
    }

    impl Trickle {
        fn new(data: &[u8], step: usize) -> Self {
            Self {
                data: data.to_vec(),
                pos: 0,
                step,
                reads: 0,
            }
        }
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let end = (self.pos + self.step).min(self.data.len()).min(self.pos + buf.len());
            let n = end - self.pos;
            buf[..n].copy_from_slice(&self.data[self.pos..end]);
            self.pos = end;
            Ok(n)
        }
    }

    #[test]
    fn test_simple_get() {
        let mut stream = Cursor::new(b"GET / HTTP/1.1\r\nHost: localhost:8000\r\n\r\n".to_vec());
        let message = read_request(&mut stream).unwrap();

        assert_eq!(
            message.start_line,
            StartLine::Request {
                method: Method::GET,
                target: "/".to_string(),
                version: "HTTP/1.1".to_string(),
            }
        );
        assert_eq!(message.headers.get("host"), Some("localhost:8000"));
        assert!(message.body.is_empty());
    }

    #[test]
    fn test_body_completed_across_partial_reads() {
        let body = vec![b'x'; 10_000];
        let mut raw = format!(
            "POST /registrasi.html HTTP/1.1\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        raw.extend_from_slice(&body);

        for step in [1, 7, 100, RECV_BUF, 3 * RECV_BUF] {
            let mut stream = Trickle::new(&raw, step);
            let message = read_request(&mut stream).unwrap();
            assert_eq!(message.body.len(), 10_000, "step {}", step);
            assert_eq!(message.body, body);
        }
    }

    #[test]
    fn test_terminator_split_between_reads() {
        let raw = b"GET /index.html HTTP/1.1\r\nHost: a\r\n\r\n";
        // El terminador queda repartido entre la lectura 2 y la 3
        let mut stream = Trickle::new(raw, 17);
        let message = read_request(&mut stream).unwrap();
        assert_eq!(message.headers.get("Host"), Some("a"));
    }

    #[test]
    fn test_extra_bytes_after_declared_length_are_dropped() {
        let mut stream = Cursor::new(b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef".to_vec());
        let message = read_request(&mut stream).unwrap();
        assert_eq!(message.body, b"abc");
    }

    #[test]
    fn test_without_content_length_no_extra_reads() {
        let raw = b"POST / HTTP/1.1\r\nHost: a\r\n\r\nemail=a";
        let mut stream = Trickle::new(raw, raw.len());
        let message = read_request(&mut stream).unwrap();

        assert_eq!(message.body, b"email=a");
        assert_eq!(stream.reads, 1);
    }

    #[test]
    fn test_head_only_never_reads_body() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 5000\r\n\r\n";
        let mut stream = Trickle::new(raw, raw.len());
        let message = read_response(&mut stream, BodyMode::HeadOnly).unwrap();

        assert_eq!(message.status(), Some(200));
        assert_eq!(message.content_length(), Some(5000));
        assert!(message.body.is_empty());
        assert_eq!(stream.reads, 1);
    }

    #[test]
    fn test_status_line_with_spaced_reason() {
        let mut stream = Cursor::new(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n".to_vec());
        let message = read_response(&mut stream, BodyMode::Complete).unwrap();

        assert_eq!(
            message.start_line,
            StartLine::Status {
                version: "HTTP/1.1".to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            }
        );
    }

    #[test]
    fn test_round_trip() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=UTF-8\r\nContent-Length: 4\r\nDate: Sun, 06 Nov 1994 08:49:37 GMT\r\n\r\nhola";
        let mut stream = Cursor::new(raw.to_vec());
        let message = read_response(&mut stream, BodyMode::Complete).unwrap();
        assert_eq!(message.to_bytes(), raw.to_vec());
    }

    #[test]
    fn test_empty_stream() {
        let mut stream = Cursor::new(Vec::new());
        assert!(matches!(read_request(&mut stream), Err(FramingError::Empty)));
    }

    #[test]
    fn test_unterminated_head() {
        let mut stream = Cursor::new(b"GET / HTTP/1.1\r\nHost: a\r\n".to_vec());
        assert!(matches!(
            read_request(&mut stream),
            Err(FramingError::UnterminatedHead)
        ));
    }

    #[test]
    fn test_request_line_needs_three_tokens() {
        for raw in [
            &b"GET\r\n\r\n"[..],
            &b"GET /\r\n\r\n"[..],
            &b"GET / HTTP/1.1 extra\r\n\r\n"[..],
        ] {
            let mut stream = Cursor::new(raw.to_vec());
            assert!(matches!(
                read_request(&mut stream),
                Err(FramingError::InvalidStartLine(_))
            ));
        }
    }

    #[test]
    fn test_truncated_body() {
        let mut stream = Cursor::new(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc".to_vec());
        match read_request(&mut stream) {
            Err(FramingError::TruncatedBody { expected, received }) => {
                assert_eq!(expected, 10);
                assert_eq!(received, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_content_length() {
        let mut stream = Cursor::new(b"POST / HTTP/1.1\r\nContent-Length: diez\r\n\r\n".to_vec());
        assert!(matches!(
            read_request(&mut stream),
            Err(FramingError::InvalidContentLength(_))
        ));
    }

    #[test]
    fn test_invalid_header() {
        let mut stream = Cursor::new(b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n".to_vec());
        assert!(matches!(
            read_request(&mut stream),
            Err(FramingError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_head_too_large() {
        let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_HEAD_BYTES + RECV_BUF));
        let mut stream = Cursor::new(raw);
        assert!(matches!(
            read_request(&mut stream),
            Err(FramingError::HeadTooLarge)
        ));
    }
}
