//! Declarative macros for ergonomic effect construction
//!
//! These macros reduce boilerplate when reducers build `Effect` values.

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use gopypi_admin_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(5),
///     action: MessageMutation::Hide(id)
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Wrap an effect so it can later be cancelled by id
///
/// # Example
///
/// ```rust,ignore
/// use gopypi_admin_core::{cancellable, delay};
///
/// cancellable! {
///     id: message.id.clone(),
///     effect: delay! { duration: ttl, action: MessageMutation::Hide(message.id) }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $crate::effect::EffectId::from($id),
            effect: ::std::boxed::Box::new($effect),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;
    use std::time::Duration;

    #[derive(Clone, Debug)]
    enum TestAction {
        Expired(String),
    }

    #[test]
    fn test_delay_macro() {
        let effect = delay! {
            duration: Duration::from_secs(5),
            action: TestAction::Expired("a".to_string())
        };

        assert!(matches!(effect, Effect::Delay { .. }));
    }

    #[test]
    fn test_cancellable_macro() {
        let id = String::from("msg-1");
        let effect = cancellable! {
            id: id.clone(),
            effect: delay! {
                duration: Duration::from_secs(5),
                action: TestAction::Expired(id)
            }
        };

        match effect {
            Effect::Cancellable { id, effect } => {
                assert_eq!(id.as_str(), "msg-1");
                assert!(matches!(*effect, Effect::Delay { .. }));
            },
            other => unreachable!("unexpected effect {other:?}"),
        }
    }
}
