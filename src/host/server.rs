use anyhow::Result;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::{
    codec::{AnyDelimiterCodec, FramedRead, LengthDelimitedCodec},
    sync::CancellationToken,
};
use tracing::{debug, warn};

use crate::ledger::ResetScope;

use super::{
    protocol::{Framing, Request, Response, MAX_MESSAGE_LENGTH},
    tracker::TrackerHandle,
};

/// Answers requests read from `reader`, one response per request in the same `framing`, until
/// the input ends or `shutdown` fires. Only I/O errors and broken framing stop it, a message that
/// can't be understood gets a failure response.
pub async fn serve<R, W>(
    reader: R,
    writer: W,
    framing: Framing,
    tracker: TrackerHandle,
    shutdown: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match framing {
        Framing::NativeMessaging => {
            let codec = LengthDelimitedCodec::builder()
                .length_field_length(4)
                .native_endian()
                .max_frame_length(MAX_MESSAGE_LENGTH)
                .new_codec();
            let messages = FramedRead::new(reader, codec);
            answer(messages, writer, framing, tracker, shutdown).await
        }
        Framing::Lines => {
            let codec = AnyDelimiterCodec::new_with_max_length(
                b"\n".to_vec(),
                b"\n".to_vec(),
                MAX_MESSAGE_LENGTH,
            );
            let messages = FramedRead::new(reader, codec);
            answer(messages, writer, framing, tracker, shutdown).await
        }
    }
}

async fn answer<M, E, T, W>(
    mut messages: M,
    mut writer: W,
    framing: Framing,
    tracker: TrackerHandle,
    shutdown: CancellationToken,
) -> Result<()>
where
    M: Stream<Item = Result<T, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
    T: AsRef<[u8]>,
    W: AsyncWrite + Unpin,
{
    loop {
        let message = tokio::select! {
            _ = shutdown.cancelled() => break,
            message = messages.next() => message,
        };
        let Some(message) = message else {
            debug!("Input closed");
            break;
        };
        let message = message?;
        let message = message.as_ref();
        if message.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let response = match Request::parse(message) {
            Ok(request) => handle(request, &tracker).await,
            Err(e) => {
                warn!("Rejected message {e}");
                Response::failure(format!("Invalid message: {e}"))
            }
        };

        let encoded = framing.frame(serde_json::to_vec(&response)?)?;
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }
    Ok(())
}

async fn handle(request: Request, tracker: &TrackerHandle) -> Response {
    let result = match request {
        Request::RecordTimeSpent(event) => tracker.record(event).await,
        Request::GetTimeStats => {
            return match serde_json::to_value(tracker.stats()) {
                Ok(stats) => Response::with_data(stats),
                Err(e) => Response::failure(e),
            }
        }
        Request::ResetTimeStats => tracker.reset(ResetScope::Activity).await,
        Request::ReanalyzeFromCategories(overrides) => {
            tracker.reanalyze(overrides).await.map(|_| ())
        }
        Request::ResetCategories => tracker.reset(ResetScope::Categories).await,
        Request::ResetAll => tracker.reset(ResetScope::Everything).await,
    };
    match result {
        Ok(()) => Response::ack(),
        Err(e) => Response::failure(e),
    }
}
