use axum::{extract::State, Json};
use cragclub_shared::account::{handle::*, UserView};

use crate::{Auth, Error, Global};

/// Register an account.
pub async fn register(
    State(Global { db, config, .. }): State<Global>,
    Json(desc): Json<RegisterDescriptor>,
) -> Result<Json<RegisterResult>, Error> {
    crate::membership::register_user(&db, &config, desc)
        .await
        .map(Json)
}

/// Login to an account and get a new token.
pub async fn login(
    State(Global {
        db, config, tokens, ..
    }): State<Global>,
    Json(LoginDescriptor { email, password }): Json<LoginDescriptor>,
) -> Result<Json<LoginResult>, Error> {
    let account_id = super::verify_password(&db, &email, &password).await?;
    let (token, expire_at) = tokens.issue(&account_id, config.token_expire_days);
    tracing::info!("account {account_id} logged in");
    Ok(Json(LoginResult {
        account_id,
        token,
        expire_at: expire_at.map(|e| e.timestamp()),
    }))
}

/// Revoke the token of this request.
pub async fn logout(
    State(Global { tokens, .. }): State<Global>,
    auth: Auth,
) -> Result<(), Error> {
    tokens.revoke(&auth.token);
    Ok(())
}

pub async fn view(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
) -> Result<Json<UserView>, Error> {
    super::view(&db, &auth.account).await.map(Json)
}

pub async fn edit(
    State(Global { db, .. }): State<Global>,
    auth: Auth,
    Json(desc): Json<AccountEditDescriptor>,
) -> Result<(), Error> {
    super::edit(&db, &auth.account, desc).await
}

/// Delete the account of this request.
pub async fn delete(
    State(Global {
        db, config, tokens, ..
    }): State<Global>,
    auth: Auth,
    Json(AccountDeleteDescriptor { password }): Json<AccountDeleteDescriptor>,
) -> Result<(), Error> {
    super::delete_self(&db, &config, &auth.account, &password).await?;
    tokens.revoke_account(&auth.account);
    Ok(())
}

/// Manage accounts for committee members.
pub mod manage {
    use axum::{extract::State, Json};
    use cragclub_shared::account::{handle::manage::*, UserView};

    use crate::{Auth, Error, Global};

    pub async fn list(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
    ) -> Result<Json<Vec<UserView>>, Error> {
        auth.require_committee()?;
        crate::account::list(&db).await.map(Json)
    }

    /// Approve the membership of an account.
    pub async fn approve(
        State(Global {
            db,
            config,
            notifier,
            ..
        }): State<Global>,
        auth: Auth,
        Json(AccountTargetDescriptor { account_id }): Json<AccountTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::membership::approve_user(&db, &config, &notifier, &account_id).await
    }

    /// Reject the membership of an account.
    pub async fn reject(
        State(Global {
            db,
            config,
            notifier,
            ..
        }): State<Global>,
        auth: Auth,
        Json(AccountTargetDescriptor { account_id }): Json<AccountTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::membership::reject_user(&db, &config, &notifier, &account_id).await
    }

    pub async fn promote(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(AccountTargetDescriptor { account_id }): Json<AccountTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::account::promote(&db, &account_id).await
    }

    pub async fn demote(
        State(Global { db, config, .. }): State<Global>,
        auth: Auth,
        Json(AccountTargetDescriptor { account_id }): Json<AccountTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::account::demote(&db, &config, &account_id).await
    }

    pub async fn set_committee_roles(
        State(Global { db, .. }): State<Global>,
        auth: Auth,
        Json(SetCommitteeRolesDescriptor { account_id, roles }): Json<SetCommitteeRolesDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::account::set_committee_roles(&db, &account_id, &roles).await
    }

    pub async fn delete(
        State(Global {
            db, config, tokens, ..
        }): State<Global>,
        auth: Auth,
        Json(AccountTargetDescriptor { account_id }): Json<AccountTargetDescriptor>,
    ) -> Result<(), Error> {
        auth.require_committee()?;
        crate::account::delete_user(&db, &config, &account_id).await?;
        tokens.revoke_account(&account_id);
        Ok(())
    }
}
