//! Shorthand for the effects wizard reducers return.

/// A save as an `Effect::Future`.
///
/// `repository` must evaluate to an owned value with an async
/// `save(&EventDraft, DraftPatch) -> Result<EventDraft, _>`. Whichever
/// closure matches the outcome builds the feedback action.
///
/// ```rust,ignore
/// save_draft! {
///     repository: env.repository.clone(),
///     base: state.draft.clone(),
///     patch: outgoing,
///     on_success: |draft| Some(WizardAction::Saved { request, draft }),
///     on_error: |error| Some(WizardAction::SaveFailed { request, error })
/// }
/// ```
#[macro_export]
macro_rules! save_draft {
    (
        repository: $repository:expr,
        base: $base:expr,
        patch: $patch:expr,
        on_success: |$saved:ident| $on_success:expr,
        on_error: |$failure:ident| $on_error:expr
    ) => {{
        let (repository, base, patch) = ($repository, $base, $patch);
        $crate::async_effect! {
            match repository.save(&base, patch).await {
                ::std::result::Result::Ok($saved) => $on_success,
                ::std::result::Result::Err($failure) => $on_error,
            }
        }
    }};
}

/// An `Effect::Future` from the body of an `async move` block.
///
/// ```rust,ignore
/// async_effect! {
///     repository.stash(&working);
///     None
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(::std::boxed::Box::pin(async move { $($body)* }))
    };
}
