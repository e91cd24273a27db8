use cragclub_shared::account::{handle::*, UserView};

/// Revokes the token in use.
pub struct Logout;

/// Views the logged in account.
pub struct View;

requests! {
    json RegisterDescriptor => "/api/account/register": RegisterResult,
    json LoginDescriptor => "/api/account/login": LoginResult,
    empty Logout => "/api/account/logout": (),
    empty View => "/api/account/view": UserView,
    json AccountEditDescriptor => "/api/account/edit": (),
    json AccountDeleteDescriptor => "/api/account/delete": (),
}
