use crate::di::CollaboratorRegistry;
use crate::error::WebUiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

/// Axum extractor resolving a collaborator from the server state
///
/// # Example
/// ```rust,ignore
/// async fn backpack(Inject(inventory): Inject<InventoryService>) -> Json<Backpack> {
///     Json(inventory.backpack_of(user_id).await)
/// }
/// ```
pub struct Inject<T: ?Sized>(pub Arc<T>);

/// Server state that carries the collaborator registry
pub trait HasCollaborators {
    fn collaborators(&self) -> &CollaboratorRegistry;
}

impl<S, T> FromRequestParts<S> for Inject<T>
where
    S: Send + Sync + HasCollaborators,
    T: ?Sized + Send + Sync + 'static,
{
    type Rejection = WebUiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        state.collaborators().resolve::<T>().map(Inject).map_err(|e| {
            tracing::error!("Configuration error serving {}: {}", parts.uri, e);
            e
        })
    }
}

impl<T: ?Sized> std::ops::Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Inject(Arc::clone(&self.0))
    }
}
