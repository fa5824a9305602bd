use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use chat_widget_model::{ErrorKind, ResponseBody};
use pin_project_lite::pin_project;
use reqwest::Response;

use crate::Error;

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextChunk = (reqwest::Result<Option<Bytes>>, Response);

pin_project! {
    /// The streamed body of a successful `/chat` response.
    pub struct HttpBody {
        next_chunk_fut: Option<PinnedFuture<NextChunk>>,
    }
}

impl HttpBody {
    #[inline]
    pub(crate) fn from_response(response: Response) -> Self {
        Self {
            next_chunk_fut: Some(next_chunk(response)),
        }
    }
}

// The response moves through the futures, so that the body doesn't need
// to borrow from itself.
fn next_chunk(mut response: Response) -> PinnedFuture<NextChunk> {
    Box::pin(async move {
        let chunk = response.chunk().await;
        (chunk, response)
    })
}

impl ResponseBody for HttpBody {
    type Error = crate::Error;

    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<Bytes>, Self::Error>> {
        let this = self.project();
        let Some(next_chunk_fut) = this.next_chunk_fut else {
            return Poll::Ready(Ok(None));
        };
        let (chunk, response) = ready!(next_chunk_fut.as_mut().poll(cx));
        match chunk {
            Ok(Some(bytes)) => {
                trace!("received {} bytes", bytes.len());
                *this.next_chunk_fut = Some(next_chunk(response));
                Poll::Ready(Ok(Some(bytes)))
            }
            Ok(None) => {
                *this.next_chunk_fut = None;
                Poll::Ready(Ok(None))
            }
            Err(err) => {
                *this.next_chunk_fut = None;
                Poll::Ready(Err(Error::new(
                    format!("{err}"),
                    ErrorKind::Failure,
                )))
            }
        }
    }
}
