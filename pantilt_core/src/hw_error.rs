//! Maps `Box<dyn Error>` from trait boundaries to typed `TrackerError`.
//!
//! The traits in `pantilt_traits` use `Box<dyn Error + Send + Sync>` so any
//! driver can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `pantilt_hardware::HwError`.

use crate::error::TrackerError;

/// Which collaborator raised the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    Detector,
    Mechanism,
}

/// Map a trait-boundary error to a typed `TrackerError`.
///
/// Known hardware error types are downcast first; anything else is
/// attributed to the collaborator that returned it.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static), from: Collaborator) -> TrackerError {
    #[cfg(feature = "hardware-errors")]
    {
        use pantilt_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::Detector(msg) => TrackerError::Detector(msg.clone()),
                other => TrackerError::ActuatorFault(other.to_string()),
            };
        }
    }

    if let Some(te) = e.downcast_ref::<TrackerError>() {
        return te.clone();
    }

    let s = e.to_string();
    match from {
        Collaborator::Detector => TrackerError::Detector(s),
        Collaborator::Mechanism => TrackerError::Actuator(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untyped_errors_follow_the_collaborator() {
        let e: Box<dyn std::error::Error + Send + Sync> = "boom".into();
        assert!(matches!(
            map_hw_error(&*e, Collaborator::Detector),
            TrackerError::Detector(ref m) if m == "boom"
        ));
        assert!(matches!(
            map_hw_error(&*e, Collaborator::Mechanism),
            TrackerError::Actuator(ref m) if m == "boom"
        ));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn hardware_errors_are_downcast() {
        use pantilt_hardware::error::HwError;
        let gpio: Box<dyn std::error::Error + Send + Sync> =
            Box::new(HwError::Gpio("pin 12".into()));
        assert!(matches!(
            map_hw_error(&*gpio, Collaborator::Mechanism),
            TrackerError::ActuatorFault(_)
        ));
        let det: Box<dyn std::error::Error + Send + Sync> =
            Box::new(HwError::Detector("bad".into()));
        assert!(matches!(
            map_hw_error(&*det, Collaborator::Mechanism),
            TrackerError::Detector(_)
        ));
    }
}
