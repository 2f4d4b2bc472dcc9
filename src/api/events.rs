//! Live update stream from the proxy's `/sse` endpoint.
//!
//! Every `message` event means "something changed"; the payload is not used.
//! In the browser the stream is an `EventSource`, which reconnects on its own.
//! On desktop the stream is read over reqwest and parsed by [`SseParser`].

use crate::api::error::ApiError;
use std::future::Future;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Incremental `text/event-stream` decoder.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: Vec<u8>,
    event: String,
    data: String,
    retry_ms: Option<u64>,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns the events completed by this chunk.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(end) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw[..end]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Drops a half-read block before reading a new connection. The advertised
    /// retry delay is kept.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.event.clear();
        self.data.clear();
    }

    /// Reconnection delay most recently advertised by the server.
    pub fn retry_ms(&self) -> Option<u64> {
        self.retry_ms
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = value.to_string(),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => {
                self.retry_ms = value.parse().ok();
            }
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event = std::mem::take(&mut self.event);
        let mut data = std::mem::take(&mut self.data);
        if data.is_empty() {
            return None;
        }
        data.pop();
        Some(SseEvent {
            event: if event.is_empty() {
                "message".to_string()
            } else {
                event
            },
            data,
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn reconnect_delay_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// Runs `on_message` once per `message` event, reconnecting forever.
#[cfg(not(target_arch = "wasm32"))]
pub async fn watch<F, Fut>(url: &str, default_retry_ms: u64, mut on_message: F) -> Result<(), ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut parser = SseParser::new();
    loop {
        parser.reset();
        match read_stream(url, &mut parser, &mut on_message).await {
            Ok(()) => tracing::info!(url, "live update stream closed by server"),
            Err(err) => tracing::warn!(url, error = %err, "live update stream failed"),
        }
        reconnect_delay_ms(parser.retry_ms().unwrap_or(default_retry_ms)).await;
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn read_stream<F, Fut>(
    url: &str,
    parser: &mut SseParser,
    on_message: &mut F,
) -> Result<(), ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let response = crate::api::HTTP_CLIENT
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    tracing::info!(url, "live update stream connected");

    dispatch_messages(response.bytes_stream(), parser, on_message).await
}

/// Feeds body chunks through `parser` until the stream ends.
#[cfg(not(target_arch = "wasm32"))]
async fn dispatch_messages<S, B, E, F, Fut>(
    body: S,
    parser: &mut SseParser,
    on_message: &mut F,
) -> Result<(), ApiError>
where
    S: futures_util::Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<ApiError>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    use futures_util::StreamExt;

    let mut body = std::pin::pin!(body);
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(Into::into)?;
        for event in parser.feed(chunk.as_ref()) {
            if event.event == "message" {
                tracing::debug!(data = %event.data, "live update");
                on_message().await;
            } else {
                tracing::debug!(event = %event.event, "ignoring live update event");
            }
        }
    }
    Ok(())
}

/// Runs `on_message` once per `message` event until the page unloads.
#[cfg(target_arch = "wasm32")]
pub async fn watch<F, Fut>(url: &str, _default_retry_ms: u64, mut on_message: F) -> Result<(), ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    use futures_util::StreamExt;
    use gloo_net::eventsource::futures::EventSource;
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut source =
        EventSource::new(url).map_err(|err| ApiError::EventStream(format!("{err:?}")))?;
    let mut messages = source
        .subscribe("message")
        .map_err(|err| ApiError::EventStream(format!("{err:?}")))?;
    let source = Rc::new(RefCell::new(Some(source)));
    let _unload = unload::CloseOnUnload::register(source.clone());
    tracing::info!(url, "live update stream opened");

    while let Some(item) = messages.next().await {
        match item {
            Ok(_) => on_message().await,
            // The browser retries by itself.
            Err(err) => tracing::debug!(error = ?err, "live update stream interrupted"),
        }
    }
    Ok(())
}

#[cfg(target_arch = "wasm32")]
mod unload {
    use gloo_net::eventsource::futures::EventSource;
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    /// Closes the event source on `beforeunload`; removes the listener on drop.
    pub(super) struct CloseOnUnload {
        window: Option<web_sys::Window>,
        callback: Closure<dyn FnMut()>,
    }

    impl CloseOnUnload {
        pub(super) fn register(source: Rc<RefCell<Option<EventSource>>>) -> Self {
            let callback = Closure::wrap(Box::new(move || {
                if let Some(source) = source.borrow_mut().take() {
                    source.close();
                    tracing::info!("live update stream closed on unload");
                }
            }) as Box<dyn FnMut()>);
            let window = web_sys::window();
            if let Some(win) = window.as_ref() {
                let _ = win.add_event_listener_with_callback(
                    "beforeunload",
                    callback.as_ref().unchecked_ref(),
                );
            }
            Self { window, callback }
        }
    }

    impl Drop for CloseOnUnload {
        fn drop(&mut self) {
            if let Some(win) = self.window.as_ref() {
                let _ = win.remove_event_listener_with_callback(
                    "beforeunload",
                    self.callback.as_ref().unchecked_ref(),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_one_event_per_block() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event:message\ndata:player update\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                event: "message".to_string(),
                data: "player update".to_string(),
            }]
        );
    }

    #[test]
    fn waits_for_the_blank_line() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: one\n").is_empty());
        assert!(parser.feed(b"data: two").is_empty());
        let events = parser.feed(b"\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "one\ntwo");
        assert_eq!(events[0].event, "message");
    }

    #[test]
    fn handles_crlf_and_split_chunks() {
        let mut parser = SseParser::new();
        let mut events = parser.feed(b"data: a\r");
        events.extend(parser.feed(b"\n\r\ndata: b\r\n\r\n"));
        let data: Vec<&str> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec!["a", "b"]);
    }

    #[test]
    fn ignores_comments_and_empty_blocks() {
        let mut parser = SseParser::new();
        let events = parser.feed(b": keep-alive\n\nevent: ping\n\n");
        assert!(events.is_empty());
        let events = parser.feed(b"data: x\n\n");
        assert_eq!(events[0].event, "message");
    }

    #[test]
    fn records_retry_hint() {
        let mut parser = SseParser::new();
        assert_eq!(parser.retry_ms(), None);
        parser.feed(b"retry: 5000\n\n");
        assert_eq!(parser.retry_ms(), Some(5000));
        parser.feed(b"retry: soon\n\n");
        assert_eq!(parser.retry_ms(), Some(5000));
    }

    #[test]
    fn reset_keeps_retry_but_drops_partial_block() {
        let mut parser = SseParser::new();
        parser.feed(b"retry: 7000\n\nevent: ping\ndata: half");
        parser.reset();
        assert_eq!(parser.retry_ms(), Some(7000));

        let events = parser.feed(b"data: fresh\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                event: "message".to_string(),
                data: "fresh".to_string(),
            }]
        );
    }

    #[test]
    fn named_events_keep_their_type() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: other\ndata: 1\n\ndata: 2\n\n");
        assert_eq!(events[0].event, "other");
        assert_eq!(events[1].event, "message");
    }

    const LIVE_BODY: &[u8] =
        b"retry: 9000\n\n: keep-alive\n\ndata: player\n\nevent: ping\ndata: 1\n\n";

    #[tokio::test]
    async fn dispatch_runs_callback_only_for_messages() {
        // Split mid-line so the parser has to carry bytes across chunks.
        let (head, tail) = LIVE_BODY.split_at(20);
        let body = futures_util::stream::iter(vec![
            Ok::<_, ApiError>(head.to_vec()),
            Ok(tail.to_vec()),
        ]);
        let mut parser = SseParser::new();
        let mut calls = 0;
        let mut on_message = || {
            calls += 1;
            async {}
        };

        dispatch_messages(body, &mut parser, &mut on_message).await.unwrap();
        assert_eq!(calls, 1);
        assert_eq!(parser.retry_ms(), Some(9000));
    }

    #[tokio::test]
    async fn dispatch_stops_on_a_broken_chunk() {
        let body = futures_util::stream::iter(vec![
            Ok(b"data: a\n\n".to_vec()),
            Err(ApiError::Status {
                url: "/sse".to_string(),
                status: 502,
            }),
            Ok(b"data: b\n\n".to_vec()),
        ]);
        let mut parser = SseParser::new();
        let mut calls = 0;
        let mut on_message = || {
            calls += 1;
            async {}
        };

        let result = dispatch_messages(body, &mut parser, &mut on_message).await;
        assert!(matches!(result, Err(ApiError::Status { status: 502, .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn reads_a_served_event_stream() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/sse", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = socket.read(&mut buf).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n",
                )
                .await
                .unwrap();
            socket.write_all(LIVE_BODY).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        let mut parser = SseParser::new();
        let mut calls = 0;
        let mut on_message = || {
            calls += 1;
            async {}
        };
        read_stream(&url, &mut parser, &mut on_message).await.unwrap();

        assert_eq!(calls, 1);
        assert_eq!(parser.retry_ms(), Some(9000));
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /sse "));
        assert!(request.to_ascii_lowercase().contains("accept: text/event-stream"));
    }
}
