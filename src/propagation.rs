use crate::db::models::Account;
use crate::domain::friendship;
use crate::store::{
    AccountStore, DynAccountStore, DynPublicationStore, PublicationStore,
};

/// Push a changed profile image into every denormalized snapshot that
/// references `account`: friend edges across all accounts, and the
/// creator block of the account's own publications. Comment snapshots
/// are left alone; they catch up on their own like/edit paths.
///
/// Best-effort: each record saves independently and a failed save only
/// logs. There is no rollback.
pub async fn propagate_profile_image(
    accounts: &DynAccountStore,
    publications: &DynPublicationStore,
    account: &Account,
) {
    match accounts.all().await {
        Ok(all) => {
            for mut other in all {
                if other.id == account.id {
                    continue;
                }
                let changed = friendship::refresh_edge_snapshots(
                    &mut other,
                    &account.id,
                    account.profile_image.as_deref(),
                );
                if changed {
                    if let Err(e) = accounts.update(&other).await {
                        tracing::warn!(
                            "failed to refresh friend snapshot on account {}: {}",
                            other.id,
                            e
                        );
                    }
                }
            }
        }
        Err(e) => tracing::warn!("profile fan-out could not list accounts: {}", e),
    }

    match publications.by_creator(&account.id).await {
        Ok(owned) => {
            for mut publication in owned {
                if publication.creator.profile_image != account.profile_image {
                    publication.creator.profile_image = account.profile_image.clone();
                    if let Err(e) = publications.update(&publication).await {
                        tracing::warn!(
                            "failed to refresh creator snapshot on publication {}: {}",
                            publication.id,
                            e
                        );
                    }
                }
            }
        }
        Err(e) => tracing::warn!("profile fan-out could not list publications: {}", e),
    }
}
