//! Streaming decoder for newline-delimited query output.
//!
//! Turns a buffered byte stream into a lazy sequence of [`ServerRecord`]s.
//! The sequence is single-pass: once the body is exhausted, or a fatal read
//! error occurs, every further call returns `None`.

use futures_util::stream::{self, Stream};
use log::trace;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    error::{is_transient_io, KsqlLinkError, Result},
    models::ServerRecord,
};

/// Decodes one record per line from an [`AsyncBufRead`].
pub struct RecordDecoder<R> {
    reader: R,
    line: Vec<u8>,
    lines_read: u64,
    finished: bool,
}

impl<R> RecordDecoder<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::with_capacity(512),
            lines_read: 0,
            finished: false,
        }
    }

    /// Next record, or `None` once the stream has ended.
    ///
    /// Blank lines are skipped. A line that fails to decode yields
    /// `Some(Err(DecodeError))` and the decoder remains usable. A fatal I/O
    /// error yields `Some(Err(Io))` and ends the sequence; a transient one
    /// leaves it open.
    pub async fn next_record(&mut self) -> Option<Result<ServerRecord>> {
        loop {
            if self.finished {
                return None;
            }

            // `line` is only cleared once a complete line has been decoded, so
            // bytes read before a transient error are joined with the rest.
            match self.reader.read_until(b'\n', &mut self.line).await {
                Ok(0) => {
                    trace!("[KSQL_QUERY] stream closed after {} lines", self.lines_read);
                    return self.finish_with_fragment();
                }
                // An unterminated trailing fragment arrives here as a normal read.
                Ok(_) => match self.take_line() {
                    None => continue,
                    decoded => return decoded,
                },
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return self.finish_with_fragment();
                }
                Err(e) => {
                    if !is_transient_io(&e) {
                        self.finished = true;
                        self.line.clear();
                    }
                    return Some(Err(KsqlLinkError::Io(e)));
                }
            }
        }
    }

    /// Decode and clear the buffered line. `None` for a blank line.
    fn take_line(&mut self) -> Option<Result<ServerRecord>> {
        self.lines_read += 1;
        let decoded = ServerRecord::decode_line(&self.line);
        self.line.clear();
        decoded.transpose()
    }

    fn finish_with_fragment(&mut self) -> Option<Result<ServerRecord>> {
        self.finished = true;
        if self.line.is_empty() {
            return None;
        }
        self.take_line()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Number of lines consumed so far, blank lines included
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// The decoder as a [`Stream`] of records.
    pub fn into_stream(self) -> impl Stream<Item = Result<ServerRecord>> {
        stream::unfold(self, |mut decoder| async move {
            decoder.next_record().await.map(|item| (item, decoder))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use serde_json::json;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, BufReader, ReadBuf};

    #[tokio::test]
    async fn test_blank_line_between_rows() {
        let body: &[u8] = b"{\"row\":{\"columns\":[1,\"a\"]}}\n\n{\"row\":{\"columns\":[2,\"b\"]}}\n";
        let mut decoder = RecordDecoder::new(body);

        let first = decoder.next_record().await.unwrap().unwrap();
        assert_eq!(first.columns().unwrap(), &[json!(1), json!("a")]);
        let second = decoder.next_record().await.unwrap().unwrap();
        assert_eq!(second.columns().unwrap(), &[json!(2), json!("b")]);
        assert!(decoder.next_record().await.is_none());
        assert_eq!(decoder.lines_read(), 3);
    }

    #[tokio::test]
    async fn test_whitespace_lines_do_not_end_stream() {
        let body: &[u8] = b"  \r\n\t\n{\"row\":{\"columns\":[]}}\n   \n";
        let records: Vec<_> = RecordDecoder::new(body).into_stream().collect().await;
        assert_eq!(records.len(), 1);
        assert!(records[0].as_ref().unwrap().is_row());
    }

    #[tokio::test]
    async fn test_decode_error_does_not_end_stream() {
        let body: &[u8] = b"{\"row\":{\"columns\":[1]}}\nnot json\n{\"row\":{\"columns\":[2]}}\n";
        let records: Vec<_> = RecordDecoder::new(body).into_stream().collect().await;

        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(matches!(records[1], Err(KsqlLinkError::DecodeError { .. })));
        assert_eq!(
            records[2].as_ref().unwrap().columns().unwrap(),
            &[json!(2)]
        );
    }

    #[tokio::test]
    async fn test_unterminated_trailing_line() {
        let body: &[u8] = b"{\"row\":{\"columns\":[1]}}\n{\"row\":{\"columns\":[2]}}";
        let records: Vec<_> = RecordDecoder::new(body).into_stream().collect().await;
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_body_ends_immediately() {
        let mut decoder = RecordDecoder::new(&b""[..]);
        assert!(decoder.next_record().await.is_none());
        assert!(decoder.is_finished());
        assert!(decoder.next_record().await.is_none());
    }

    enum Step {
        Data(&'static [u8]),
        Fail(io::ErrorKind),
    }

    /// Plays its steps in order, then reports EOF.
    struct ScriptedReader {
        steps: Vec<Step>,
    }

    impl ScriptedReader {
        fn new(steps: Vec<Step>) -> BufReader<Self> {
            BufReader::new(Self { steps })
        }
    }

    impl AsyncRead for ScriptedReader {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            if self.steps.is_empty() {
                return Poll::Ready(Ok(()));
            }
            match self.steps.remove(0) {
                Step::Data(chunk) => {
                    buf.put_slice(chunk);
                    Poll::Ready(Ok(()))
                }
                Step::Fail(kind) => Poll::Ready(Err(io::Error::new(kind, "injected"))),
            }
        }
    }

    #[tokio::test]
    async fn test_fatal_io_error_finishes_decoder() {
        let reader = ScriptedReader::new(vec![
            Step::Data(b"{\"row\":{\"columns\":[1]}}\n"),
            Step::Fail(io::ErrorKind::ConnectionReset),
        ]);
        let mut decoder = RecordDecoder::new(reader);

        assert!(decoder.next_record().await.unwrap().is_ok());
        let err = decoder.next_record().await.unwrap().unwrap_err();
        assert!(!err.is_transient());
        assert!(decoder.is_finished());
        assert!(decoder.next_record().await.is_none());
    }

    #[tokio::test]
    async fn test_transient_io_error_keeps_decoder_open() {
        let reader = ScriptedReader::new(vec![Step::Fail(io::ErrorKind::TimedOut)]);
        let mut decoder = RecordDecoder::new(reader);

        let err = decoder.next_record().await.unwrap().unwrap_err();
        assert!(err.is_transient());
        assert!(!decoder.is_finished());
        assert!(decoder.next_record().await.is_none());
    }

    #[tokio::test]
    async fn test_row_split_by_transient_error_is_kept() {
        let reader = ScriptedReader::new(vec![
            Step::Data(b"{\"row\":{\"colu"),
            Step::Fail(io::ErrorKind::TimedOut),
            Step::Data(b"mns\":[1]}}\n"),
        ]);
        let mut decoder = RecordDecoder::new(reader);

        let err = decoder.next_record().await.unwrap().unwrap_err();
        assert!(err.is_transient());
        let record = decoder.next_record().await.unwrap().unwrap();
        assert_eq!(record.columns().unwrap(), &[json!(1)]);
        assert!(decoder.next_record().await.is_none());
    }

    #[tokio::test]
    async fn test_fragment_before_transient_error_and_eof_is_decoded() {
        let reader = ScriptedReader::new(vec![
            Step::Data(b"{\"row\":{\"columns\":[7]}}"),
            Step::Fail(io::ErrorKind::Interrupted),
        ]);
        let mut decoder = RecordDecoder::new(reader);

        assert!(decoder.next_record().await.unwrap().unwrap_err().is_transient());
        let record = decoder.next_record().await.unwrap().unwrap();
        assert_eq!(record.columns().unwrap(), &[json!(7)]);
        assert!(decoder.is_finished());
    }
}
