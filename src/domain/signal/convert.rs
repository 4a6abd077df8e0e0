//! Conversion: SignalResponse → Signal (TryFrom + validation).

use super::wire::SignalResponse;
use super::{Signal, SignalType, SignalValidationError};
use crate::shared::Timestamp;

impl TryFrom<SignalResponse> for Signal {
    type Error = SignalValidationError;

    fn try_from(source: SignalResponse) -> Result<Self, Self::Error> {
        let mut errors: Vec<SignalValidationError> = Vec::new();

        let signal_type = source.signal_type.parse::<SignalType>();
        let timestamp = Timestamp::parse(&source.timestamp);

        if let Err(e) = &timestamp {
            errors.push(SignalValidationError::InvalidTimestamp(e.clone()));
        }
        if !source.price.is_finite() {
            errors.push(SignalValidationError::NonFinite("price"));
        }
        if !source.z_score.is_finite() {
            errors.push(SignalValidationError::NonFinite("z_score"));
        }

        match (signal_type, timestamp) {
            (Ok(signal_type), Ok(timestamp)) if errors.is_empty() => Ok(Signal {
                symbol: source.symbol.into(),
                price: source.price,
                timestamp,
                z_score: source.z_score,
                signal_type,
            }),
            (signal_type, _) => {
                if let Err(e) = signal_type {
                    errors.insert(0, e);
                }
                Err(SignalValidationError::Multiple(source.symbol, errors))
            }
        }
    }
}
