//! AI provider implementations

use futures_util::{Stream, StreamExt};

pub mod ollama;
pub mod gemini;

// Re-export for convenience
pub use ollama::OllamaClient;
pub use gemini::GeminiClient;

/// Turn a line-delimited response body into a text stream.
///
/// `parse_line` maps each non-empty line to an optional output
/// item, so malformed lines can be skipped without ending the
/// stream. Both Ollama's NDJSON framing and Gemini's SSE framing
/// are line based, so one helper covers them.
pub(crate) fn buffered_line_stream<F>(
  response: reqwest::Response
, parse_line: F
) -> crate::TextStream
where
  F: FnMut(&str) -> Option<String> + Send + 'static
{   decode_line_stream(response.bytes_stream(), parse_line)
}

/// Line-split a chunked byte stream and decode each line.
///
/// Raw bytes are buffered until a `\n` arrives, so lines and
/// multi-byte UTF-8 sequences may straddle chunk boundaries
/// freely; only a line that fails to decode on its own is
/// reported as a parse error. A final line the server never
/// terminated is flushed when the source ends.
fn decode_line_stream<S, B, E, F>(
  source: S
, mut parse_line: F
) -> crate::TextStream
where
  S: Stream<Item = Result<B, E>> + Send + 'static
, B: AsRef<[u8]> + Send + 'static
, E: std::fmt::Display + Send + 'static
, F: FnMut(&str) -> Option<String> + Send + 'static
{   let mut buffer: Vec<u8> = Vec::new();

    let stream = source
      .map(Some)
      .chain(futures_util::stream::iter([None]))
      .map(move |chunk| {
        let mut out: Vec<Result<String, crate::error::Error>>
          = Vec::new();

        match chunk
        {   Some(Ok(bytes)) => {
              buffer.extend_from_slice(bytes.as_ref());
              while let Some(pos)
                = buffer.iter().position(|&b| b == b'\n')
              {   let line: Vec<u8>
                    = buffer.drain(..=pos).collect();
                  decode_line(&line, &mut parse_line, &mut out);
              }
            }
          , Some(Err(e)) => {
              out.push(Err(
                crate::error::Error::GenerationError(
                  e.to_string()
                )
              ));
            }
          , None => {
              let rest = std::mem::take(&mut buffer);
              decode_line(&rest, &mut parse_line, &mut out);
            }
        }

        futures_util::stream::iter(out)
      })
      .flatten();

    Box::pin(stream)
}

/// Decode one complete line and feed it to the parser
fn decode_line<F>(
  line: &[u8]
, parse_line: &mut F
, out: &mut Vec<Result<String, crate::error::Error>>
)
where
  F: FnMut(&str) -> Option<String>
{   let line = match std::str::from_utf8(line)
    {   Ok(s) => s.trim()
      , Err(e) => {
          out.push(Err(crate::error::Error::ParseError(
            e.to_string()
          )));
          return;
        }
    };

    if line.is_empty()
    {   return;
    }
    if let Some(item) = parse_line(line)
    {   out.push(Ok(item));
    }
}

#[cfg(test)]
mod tests
{   use super::*;

    fn collect_lines(
      chunks: Vec<Result<Vec<u8>, String>>
    ) -> Vec<Result<String, crate::error::Error>>
    {   let stream = decode_line_stream(
          futures_util::stream::iter(chunks),
          |line| Some(line.to_string())
        );
        tokio_test::block_on(stream.collect::<Vec<_>>())
    }

    #[test]
    fn test_multibyte_char_split_across_chunks()
    {   let line = "{\"response\":\"café\",\"done\":true}\n"
          .as_bytes();
        // cut inside the two-byte é
        let cut = line.iter()
          .position(|&b| b == 0xC3)
          .unwrap() + 1;

        let out = collect_lines(vec![
          Ok(line[..cut].to_vec())
        , Ok(line[cut..].to_vec())
        ]);

        assert_eq!(out, vec![Ok(
          "{\"response\":\"café\",\"done\":true}".to_string()
        )]);
    }

    #[test]
    fn test_unterminated_final_line_is_flushed()
    {   let out = collect_lines(vec![
          Ok(b"alpha\nbeta".to_vec())
        ]);

        assert_eq!(out, vec![
          Ok("alpha".to_string())
        , Ok("beta".to_string())
        ]);
    }

    #[test]
    fn test_undecodable_line_does_not_end_stream()
    {   let out = collect_lines(vec![
          Ok(vec![0xFF, 0xFE, b'\n'])
        , Ok(b"after\n".to_vec())
        ]);

        assert_eq!(out.len(), 2);
        assert!(matches!(
          out[0],
          Err(crate::error::Error::ParseError(_))
        ));
        assert_eq!(out[1], Ok("after".to_string()));
    }
}
