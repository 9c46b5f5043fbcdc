//! Ownership is the only authorization rule: an acting user may touch a
//! resource only if they own it. Every owned-resource path goes through here.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Note, NoteWithTags, User};

/// Resources that belong to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Note {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

impl Owned for NoteWithTags {
    fn owner_id(&self) -> Uuid {
        self.note.user_id
    }
}

pub fn authorize(acting_user: &User, resource_owner_id: Uuid) -> Result<(), AppError> {
    if acting_user.id == resource_owner_id {
        Ok(())
    } else {
        tracing::warn!(
            user_id = %acting_user.id,
            owner_id = %resource_owner_id,
            "ownership check denied"
        );
        Err(AppError::Forbidden)
    }
}

/// Pass `resource` through if `acting_user` owns it.
pub fn ensure_owner<R: Owned>(acting_user: &User, resource: R) -> Result<R, AppError> {
    authorize(acting_user, resource.owner_id())?;
    Ok(resource)
}
