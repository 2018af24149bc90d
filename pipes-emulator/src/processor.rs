//! Turns one polled batch into target-ready events: compensating for
//! Kinesis/DynamoDB's double base64/JSON encoding, applying the input
//! template, and dispatching to the target.
//!
//! Grounded on `pipe_event_processor.py`'s `PipeEventProcessor`.

use crate::errors::ProcessError;
use crate::targets::PipeTarget;
use crate::transformer::InputTransformer;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;

/// Kinesis/DynamoDB records nest a base64-encoded JSON string under `data`,
/// sometimes more than once. Three rounds matches what the original
/// processor tolerates before giving up and leaving `data` as-is.
const MAX_DECODE_ROUNDS: usize = 3;

/// Decodes one event's `data` field, cascading through up to
/// [`MAX_DECODE_ROUNDS`] rounds of base64-decode to compensate for
/// double (or triple) encoding introduced by upstream adapters. Each round
/// base64-decodes the previous round's output and attempts to parse it as
/// JSON; the first successful parse wins and is written back immediately.
/// If every round base64-decodes cleanly but none of them ever parses as
/// JSON, the last successfully-decoded string is written back rather than
/// leaving the field untouched. Events without a string `data` field, or
/// whose `data` is already a plain JSON object, pass through unchanged.
fn decode_event(mut event: Value) -> Value {
    let Some(original) = event.get("data").and_then(Value::as_str) else {
        return event;
    };

    let mut current = original.to_string();
    let mut last_decoded: Option<String> = None;

    for _ in 0..MAX_DECODE_ROUNDS {
        let Ok(decoded_bytes) = BASE64.decode(&current) else {
            break;
        };
        let Ok(decoded_str) = String::from_utf8(decoded_bytes) else {
            break;
        };

        if let Ok(parsed) = serde_json::from_str::<Value>(&decoded_str) {
            if let Some(obj) = event.as_object_mut() {
                obj.insert("data".to_string(), parsed);
            }
            return event;
        }

        last_decoded = Some(decoded_str.clone());
        current = decoded_str;
    }

    if let Some(decoded_str) = last_decoded {
        if let Some(obj) = event.as_object_mut() {
            obj.insert("data".to_string(), Value::String(decoded_str));
        }
    }
    event
}

/// Applies decoding and (when configured) input-template transformation to
/// one batch, then hands the result to `target`.
pub async fn process_events_batch(
    events: &[Value],
    transformer: Option<&InputTransformer>,
    target: &dyn PipeTarget,
) -> Result<(), ProcessError> {
    let decoded: Vec<Value> = events.iter().cloned().map(decode_event).collect();
    let transformed: Vec<Value> = match transformer {
        Some(t) => decoded.iter().map(|event| t.transform(event)).collect(),
        None => decoded,
    };
    target.send(&transformed).await.map_err(ProcessError::from)
}

/// Builds the diagnostic payload recorded as a pipe's `state_reason` when a
/// batch fails processing.
#[must_use]
pub fn generate_event_failure_context(events: &[Value], error: &ProcessError) -> Value {
    serde_json::json!({
        "errorMessage": error.to_string(),
        "attemptedEventCount": events.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TargetError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    struct RecordingTarget {
        received: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl PipeTarget for RecordingTarget {
        async fn send(&self, events: &[Value]) -> Result<(), TargetError> {
            self.received.lock().extend_from_slice(events);
            Ok(())
        }
    }

    struct FailingTarget;

    #[async_trait]
    impl PipeTarget for FailingTarget {
        async fn send(&self, _events: &[Value]) -> Result<(), TargetError> {
            Err(TargetError::CustomerInvocation("nope".to_string()))
        }
    }

    #[test]
    fn decode_event_unwraps_base64_json_data_field() {
        let inner = json!({"x": 1});
        let encoded = BASE64.encode(inner.to_string());
        let event = json!({"data": encoded});
        assert_eq!(decode_event(event), json!({"data": {"x": 1}}));
    }

    #[test]
    fn decode_event_unwraps_doubly_base64_encoded_json_data_field() {
        let inner = json!({"x": 1});
        let once = BASE64.encode(inner.to_string());
        let twice = BASE64.encode(once);
        let event = json!({"data": twice});
        assert_eq!(decode_event(event), json!({"data": {"x": 1}}));
    }

    #[test]
    fn decode_event_writes_back_last_decoded_string_when_never_json() {
        // Three rounds of valid base64 that never decode to JSON: the
        // field should end up holding the last successfully-decoded
        // string, not the untouched original.
        let round1 = "plain text, not json".to_string();
        let round2 = BASE64.encode(&round1);
        let round3 = BASE64.encode(&round2);
        let event = json!({"data": round3});
        assert_eq!(decode_event(event), json!({"data": round1}));
    }

    #[test]
    fn decode_event_leaves_non_base64_data_untouched() {
        let event = json!({"data": "not-base64-!!!"});
        assert_eq!(decode_event(event.clone()), event);
    }

    #[test]
    fn decode_event_passes_through_events_without_data_field() {
        let event = json!({"body": "hello"});
        assert_eq!(decode_event(event.clone()), event);
    }

    #[tokio::test]
    async fn process_events_batch_sends_decoded_events_with_no_transformer() {
        let target = RecordingTarget {
            received: Mutex::new(vec![]),
        };
        let events = vec![json!({"body": "hi"})];
        process_events_batch(&events, None, &target).await.unwrap();
        assert_eq!(target.received.lock().as_slice(), events.as_slice());
    }

    #[tokio::test]
    async fn process_events_batch_applies_transformer_before_send() {
        let target = RecordingTarget {
            received: Mutex::new(vec![]),
        };
        let transformer = InputTransformer::new(
            "<aws.pipes.event.json>",
            "arn:aws:pipes:us-east-1:000000000000:pipe/p",
            "p",
            "arn:aws:sqs:us-east-1:000000000000:src",
            "arn:aws:sqs:us-east-1:000000000000:dst",
        );
        let events = vec![json!({"body": "hi"})];
        process_events_batch(&events, Some(&transformer), &target)
            .await
            .unwrap();
        assert_eq!(target.received.lock().as_slice(), events.as_slice());
    }

    #[tokio::test]
    async fn process_events_batch_propagates_target_customer_error() {
        let target = FailingTarget;
        let err = process_events_batch(&[json!({})], None, &target)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::CustomerInvocation(_)));
    }

    #[test]
    fn failure_context_reports_message_and_count() {
        let err = ProcessError::Internal("boom".to_string());
        let ctx = generate_event_failure_context(&[json!({}), json!({})], &err);
        assert_eq!(ctx["attemptedEventCount"], json!(2));
        assert_eq!(ctx["errorMessage"], json!("boom"));
    }
}
