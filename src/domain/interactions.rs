use chrono::{DateTime, Utc};
use std::fmt;

use crate::db::models::{Account, Comment, Creator, Like, Publication};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// Neither body nor photo supplied.
    NoFields,
    EmptyBody,
    CommentNotFound,
    NotOwner,
    NotAuthor,
}

impl fmt::Display for InteractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFields => write!(f, "no data provided"),
            Self::EmptyBody => write!(f, "comment body must not be empty"),
            Self::CommentNotFound => write!(f, "comment doesn't exist"),
            Self::NotOwner => write!(f, "you are not the owner of this publication"),
            Self::NotAuthor => write!(f, "you are not the author of this comment"),
        }
    }
}

impl std::error::Error for InteractionError {}

/// Empty and whitespace-only strings count as absent.
fn normalize(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

/// Build a new publication with a snapshot of the creator's display
/// fields. At least one of body/photo is required.
pub fn new_publication(
    creator: &Account,
    body: Option<String>,
    photo: Option<String>,
    now: DateTime<Utc>,
) -> Result<Publication, InteractionError> {
    let body = normalize(body);
    let photo = normalize(photo);

    if body.is_none() && photo.is_none() {
        return Err(InteractionError::NoFields);
    }

    Ok(Publication {
        id: uuid::Uuid::now_v7().to_string(),
        creator: Creator {
            identifier: creator.id.clone(),
            name: creator.name.clone(),
            profile_image: creator.profile_image.clone(),
        },
        body,
        photo,
        likes: vec![],
        comments: vec![],
        created_at: now,
    })
}

pub fn ensure_owner(publication: &Publication, actor_id: &str) -> Result<(), InteractionError> {
    if publication.creator.identifier != actor_id {
        return Err(InteractionError::NotOwner);
    }
    Ok(())
}

/// Replace body and/or photo, whichever is supplied. Owner only.
pub fn edit_publication(
    publication: &mut Publication,
    actor_id: &str,
    body: Option<String>,
    photo: Option<String>,
) -> Result<(), InteractionError> {
    ensure_owner(publication, actor_id)?;

    let body = normalize(body);
    let photo = normalize(photo);

    if body.is_none() && photo.is_none() {
        return Err(InteractionError::NoFields);
    }

    if let Some(body) = body {
        publication.body = Some(body);
    }
    if let Some(photo) = photo {
        publication.photo = Some(photo);
    }

    Ok(())
}

/// Like the publication if this account hasn't, unlike it otherwise.
pub fn toggle_like(publication: &mut Publication, actor_id: &str) {
    if publication.likes.iter().any(|l| l.identifier == actor_id) {
        publication.likes.retain(|l| l.identifier != actor_id);
    } else {
        publication.likes.push(Like {
            identifier: actor_id.to_string(),
        });
    }
}

/// Prepend a comment with a snapshot of the author's display fields.
pub fn add_comment(
    publication: &mut Publication,
    author: &Account,
    body: &str,
    now: DateTime<Utc>,
) -> Result<(), InteractionError> {
    if body.trim().is_empty() {
        return Err(InteractionError::EmptyBody);
    }

    publication.comments.insert(
        0,
        Comment {
            id: uuid::Uuid::now_v7().to_string(),
            identifier: author.id.clone(),
            name: author.name.clone(),
            profile_image: author.profile_image.clone(),
            body: body.to_string(),
            likes: vec![],
            created_at: now,
        },
    );

    Ok(())
}

/// Replace a comment's body. Author only; the author-profile snapshot is
/// brought current when it has drifted.
pub fn edit_comment(
    publication: &mut Publication,
    comment_id: &str,
    author: &Account,
    body: &str,
) -> Result<(), InteractionError> {
    let comment = publication
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or(InteractionError::CommentNotFound)?;

    if comment.identifier != author.id {
        return Err(InteractionError::NotAuthor);
    }

    if body.trim().is_empty() {
        return Err(InteractionError::EmptyBody);
    }

    comment.body = body.to_string();

    if comment.profile_image != author.profile_image {
        comment.profile_image = author.profile_image.clone();
    }

    Ok(())
}

/// Toggle a like on one comment. Any account may like; this is also the
/// only path that refreshes the comment's author-profile snapshot.
/// Returns the updated comment.
pub fn toggle_comment_like(
    publication: &mut Publication,
    comment_id: &str,
    actor_id: &str,
    author_profile: Option<&str>,
) -> Result<Comment, InteractionError> {
    let comment = publication
        .comments
        .iter_mut()
        .find(|c| c.id == comment_id)
        .ok_or(InteractionError::CommentNotFound)?;

    if comment.likes.iter().any(|l| l.identifier == actor_id) {
        comment.likes.retain(|l| l.identifier != actor_id);
    } else {
        comment.likes.push(Like {
            identifier: actor_id.to_string(),
        });
    }

    if comment.profile_image.as_deref() != author_profile {
        comment.profile_image = author_profile.map(str::to_string);
    }

    Ok(comment.clone())
}

/// Remove a comment by id. Author only.
pub fn delete_comment(
    publication: &mut Publication,
    comment_id: &str,
    actor_id: &str,
) -> Result<(), InteractionError> {
    let comment = publication
        .comments
        .iter()
        .find(|c| c.id == comment_id)
        .ok_or(InteractionError::CommentNotFound)?;

    if comment.identifier != actor_id {
        return Err(InteractionError::NotAuthor);
    }

    publication.comments.retain(|c| c.id != comment_id);
    Ok(())
}
