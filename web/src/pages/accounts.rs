//! Account management (`/accountmanagement`): users and admins CRUD.

use leptos::ev::SubmitEvent;
use leptos::logging::warn;
use leptos::prelude::*;

use hydrowatch_common::model::{non_blank, Account, AccountDraft, Establishment};
use hydrowatch_common::{BackendClient, Result, Role};

use crate::state::use_app;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Users,
    Admins,
}

impl Table {
    fn title(self) -> &'static str {
        match self {
            Table::Users => "Users",
            Table::Admins => "Admins",
        }
    }

    fn role(self) -> Role {
        match self {
            Table::Users => Role::User,
            Table::Admins => Role::Admin,
        }
    }

    async fn list(self, client: &BackendClient) -> Result<Vec<Account>> {
        match self {
            Table::Users => client.users().await,
            Table::Admins => client.admins().await,
        }
    }

    async fn save(self, client: &BackendClient, id: Option<&str>, draft: &AccountDraft) -> Result<Account> {
        match (self, id) {
            (Table::Users, None) => client.create_user(draft).await,
            (Table::Users, Some(id)) => client.update_user(id, draft).await,
            (Table::Admins, None) => client.create_admin(draft).await,
            (Table::Admins, Some(id)) => client.update_admin(id, draft).await,
        }
    }

    async fn delete(self, client: &BackendClient, id: &str) -> Result<()> {
        match self {
            Table::Users => client.delete_user(id).await,
            Table::Admins => client.delete_admin(id).await,
        }
    }
}

#[component]
pub fn AccountsPage() -> impl IntoView {
    let ctx = use_app();
    let table = RwSignal::new(Table::Users);
    let reload = RwSignal::new(0u32);
    let (rows, set_rows) = signal(Vec::<Account>::new());
    let (sites, set_sites) = signal(Vec::<Establishment>::new());
    let (error, set_error) = signal(Option::<String>::None);

    // Form state; `editing` holds the id of the row being edited.
    let editing = RwSignal::new(Option::<String>::None);
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let verified = RwSignal::new(false);
    let site = RwSignal::new(String::new());

    let reset_form = move || {
        editing.set(None);
        username.set(String::new());
        email.set(String::new());
        password.set(String::new());
        verified.set(false);
        site.set(String::new());
    };

    Effect::new(move |_| {
        let which = table.get();
        reload.track();
        let Some(client) = ctx.client() else { return };
        leptos::task::spawn_local(async move {
            match which.list(&client).await {
                Ok(list) => set_rows.set(list),
                Err(e) => {
                    warn!("Cannot load {}: {e}", which.title());
                    set_error.set(Some(e.user_message()));
                }
            }
        });
    });

    Effect::new(move |_| {
        let Some(client) = ctx.client() else { return };
        leptos::task::spawn_local(async move {
            match client.establishments().await {
                Ok(list) => set_sites.set(list),
                Err(e) => warn!("Cannot load establishments: {e}"),
            }
        });
    });

    let start_edit = move |a: Account| {
        let draft = AccountDraft::from_account(&a);
        editing.set(Some(a.id));
        username.set(draft.username);
        email.set(draft.email);
        password.set(String::new());
        verified.set(draft.is_verified.unwrap_or(false));
        site.set(draft.establishment_id.unwrap_or_default());
    };

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let which = table.get_untracked();
        let id = editing.get_untracked();
        let draft = AccountDraft {
            username: username.get_untracked().trim().to_string(),
            email: email.get_untracked().trim().to_string(),
            password: non_blank(&password.get_untracked()),
            role: Some(which.role()),
            is_verified: Some(verified.get_untracked()),
            establishment_id: non_blank(&site.get_untracked()),
        };
        if let Err(e) = draft.validate(id.is_none()) {
            return set_error.set(Some(e.user_message()));
        }
        let Some(client) = ctx.client_untracked() else { return };
        leptos::task::spawn_local(async move {
            match which.save(&client, id.as_deref(), &draft).await {
                Ok(_) => {
                    set_error.set(None);
                    reset_form();
                    reload.update(|n| *n += 1);
                }
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    let remove = move |id: String| {
        let which = table.get_untracked();
        let Some(client) = ctx.client_untracked() else { return };
        leptos::task::spawn_local(async move {
            match which.delete(&client, &id).await {
                Ok(()) => set_rows.update(|rows| rows.retain(|a| a.id != id)),
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    let site_name = move |id: &Option<String>| {
        let id = id.as_deref()?;
        sites.with(|s| s.iter().find(|e| e.id == id).map(|e| e.name.clone()))
    };

    view! {
        <div class="accounts-page">
            <header class="page-header">
                <h1>"Account management"</h1>
                <div class="tabs">
                    {[Table::Users, Table::Admins].into_iter().map(|t| view! {
                        <button
                            class=move || if table.get() == t { "tab active" } else { "tab" }
                            on:click=move |_| { reset_form(); table.set(t); }
                        >{t.title()}</button>
                    }).collect_view()}
                </div>
            </header>
            {move || error.get().map(|m| view! { <p class="banner banner-error">{m}</p> })}

            <table class="data-table">
                <thead>
                    <tr><th>"Username"</th><th>"Email"</th><th>"Verified"</th><th>"Establishment"</th><th></th></tr>
                </thead>
                <tbody>
                    {move || rows.get().into_iter().map(|a| {
                        let id = a.id.clone();
                        let site_label = site_name(&a.establishment_id).unwrap_or_else(|| "-".into());
                        let row = a.clone();
                        view! {
                            <tr>
                                <td>{a.username.clone()}</td>
                                <td>{a.email.clone()}</td>
                                <td>{if a.is_verified { "Yes" } else { "No" }}</td>
                                <td>{site_label}</td>
                                <td class="row-actions">
                                    <button class="btn btn-small" on:click=move |_| start_edit(row.clone())>"Edit"</button>
                                    <button class="btn btn-small btn-danger" on:click=move |_| remove(id.clone())>"Delete"</button>
                                </td>
                            </tr>
                        }
                    }).collect_view()}
                </tbody>
            </table>

            <form class="edit-form" on:submit=submit>
                <h2>{move || match editing.get() {
                    Some(_) => format!("Edit {}", table.get().role()),
                    None => format!("New {}", table.get().role()),
                }}</h2>
                <label>"Username"<input type="text" required bind:value=username/></label>
                <label>"Email"<input type="email" required bind:value=email/></label>
                <label>
                    {move || if editing.get().is_some() { "Password (leave blank to keep)" } else { "Password" }}
                    <input type="password" bind:value=password/>
                </label>
                <label class="checkbox"><input type="checkbox" bind:checked=verified/>"Verified"</label>
                <label>"Establishment"
                    <select bind:value=site>
                        <option value="">"None"</option>
                        {move || sites.get().into_iter().map(|e| view! {
                            <option value=e.id.clone()>{e.name}</option>
                        }).collect_view()}
                    </select>
                </label>
                <div class="form-actions">
                    <button class="btn btn-primary" type="submit">"Save"</button>
                    <button class="btn" type="button" on:click=move |_| reset_form()>"Cancel"</button>
                </div>
            </form>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_create_matching_roles() {
        assert_eq!(Table::Users.role(), Role::User);
        assert_eq!(Table::Admins.role(), Role::Admin);
        assert_eq!(Table::Admins.title(), "Admins");
    }
}
