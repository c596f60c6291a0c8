//! Public pages: sign in, sign up, e-mail verification and password reset.

use leptos::ev::SubmitEvent;
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::{use_navigate, use_query_map};

use hydrowatch_common::auth::{
    validate_email, validate_otp, validate_password, verify_path, ForgotPasswordRequest, LoginRequest,
    ResetPasswordRequest, SignupRequest, ValidateOtpRequest, VerifyCodeRequest,
};
use hydrowatch_common::BackendClient;

use crate::state::{use_app, AppContext};

fn backend(ctx: AppContext) -> Result<BackendClient, String> {
    ctx.client_untracked()
        .ok_or_else(|| "Still connecting to the server, try again in a moment.".to_string())
}

#[component]
fn Banner(error: ReadSignal<Option<String>>, notice: ReadSignal<Option<String>>) -> impl IntoView {
    view! {
        {move || error.get().map(|m| view! { <p class="banner banner-error">{m}</p> })}
        {move || notice.get().map(|m| view! { <p class="banner banner-ok">{m}</p> })}
    }
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let (busy, set_busy) = signal(false);
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, _) = signal(Option::<String>::None);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if let Err(e) = validate_email(&email.get_untracked()) {
            set_error.set(Some(e.user_message()));
            return;
        }
        let client = match backend(ctx) {
            Ok(c) => c,
            Err(e) => return set_error.set(Some(e)),
        };
        let req = LoginRequest {
            email: email.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        let navigate = navigate.clone();
        set_busy.set(true);
        leptos::task::spawn_local(async move {
            match client.login(&req).await {
                Ok(resp) => {
                    let landing = resp.user.role.landing();
                    match ctx.sign_in(resp.user, &resp.token) {
                        Ok(()) => {
                            log!("Signed in, opening {landing}");
                            navigate(landing, Default::default());
                        }
                        Err(e) => set_error.set(Some(e.user_message())),
                    }
                }
                Err(e) => {
                    warn!("Login failed: {e}");
                    set_error.set(Some(e.user_message()));
                }
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-form" on:submit=submit>
                <h1>"Sign in"</h1>
                <Banner error=error notice=notice/>
                <label>"Email"<input type="email" required bind:value=email/></label>
                <label>"Password"<input type="password" required bind:value=password/></label>
                <button class="btn btn-primary" type="submit" disabled=move || busy.get()>
                    {move || if busy.get() { "Signing in…" } else { "Sign in" }}
                </button>
                <p class="auth-links">
                    <A href="/forgot-password">"Forgot your password?"</A>
                    " · "
                    <A href="/signup">"Create an account"</A>
                </p>
            </form>
        </div>
    }
}

// ─── Sign up ─────────────────────────────────────────────────────────────────

#[component]
pub fn SignupPage() -> impl IntoView {
    let ctx = use_app();
    let navigate = use_navigate();
    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let (busy, set_busy) = signal(false);
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, _) = signal(Option::<String>::None);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let req = match SignupRequest::validated(
            &username.get_untracked(),
            &email.get_untracked(),
            &password.get_untracked(),
            &confirm.get_untracked(),
        ) {
            Ok(r) => r,
            Err(e) => return set_error.set(Some(e.user_message())),
        };
        let client = match backend(ctx) {
            Ok(c) => c,
            Err(e) => return set_error.set(Some(e)),
        };
        let navigate = navigate.clone();
        set_busy.set(true);
        leptos::task::spawn_local(async move {
            match client.signup(&req).await {
                Ok(_) => match verify_path(&req.email) {
                    Ok(path) => navigate(&path, Default::default()),
                    Err(e) => set_error.set(Some(e.user_message())),
                },
                Err(e) => {
                    warn!("Signup failed: {e}");
                    set_error.set(Some(e.user_message()));
                }
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-form" on:submit=submit>
                <h1>"Create an account"</h1>
                <Banner error=error notice=notice/>
                <label>"Username"<input type="text" required bind:value=username/></label>
                <label>"Email"<input type="email" required bind:value=email/></label>
                <label>"Password"<input type="password" required bind:value=password/></label>
                <label>"Confirm password"<input type="password" required bind:value=confirm/></label>
                <button class="btn btn-primary" type="submit" disabled=move || busy.get()>"Sign up"</button>
                <p class="auth-links">"Already registered? "<A href="/login">"Sign in"</A></p>
            </form>
        </div>
    }
}

// ─── Verify ──────────────────────────────────────────────────────────────────

#[component]
pub fn VerifyPage() -> impl IntoView {
    let ctx = use_app();
    let query = use_query_map();
    let email = RwSignal::new(String::new());
    let code = RwSignal::new(String::new());
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<String>::None);

    Effect::new(move |_| {
        if let Some(e) = query.with(|q| q.get("email")) {
            email.set(e);
        }
    });

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        if let Err(e) = validate_email(&email.get_untracked()).and(validate_otp(&code.get_untracked())) {
            return set_error.set(Some(e.user_message()));
        }
        let client = match backend(ctx) {
            Ok(c) => c,
            Err(e) => return set_error.set(Some(e)),
        };
        let req = VerifyCodeRequest {
            email: email.get_untracked().trim().to_string(),
            code: code.get_untracked().trim().to_string(),
        };
        leptos::task::spawn_local(async move {
            match client.verify_code(&req).await {
                Ok(ack) => {
                    set_error.set(None);
                    set_notice.set(Some(if ack.message.is_empty() {
                        "Email verified. You can now sign in.".into()
                    } else {
                        ack.message
                    }));
                }
                Err(e) => set_error.set(Some(e.user_message())),
            }
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-form" on:submit=submit>
                <h1>"Verify your email"</h1>
                <p>"Enter the 6-digit code we sent to your inbox."</p>
                <Banner error=error notice=notice/>
                <label>"Email"<input type="email" required bind:value=email/></label>
                <label>"Code"<input type="text" inputmode="numeric" maxlength="6" required bind:value=code/></label>
                <button class="btn btn-primary" type="submit">"Verify"</button>
                <p class="auth-links"><A href="/login">"Back to sign in"</A></p>
            </form>
        </div>
    }
}

// ─── Forgot password ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResetStep {
    RequestCode,
    EnterCode,
    NewPassword,
    Done,
}

/// Three-step reset: request an OTP, validate it, choose a new password.
#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let ctx = use_app();
    let step = RwSignal::new(ResetStep::RequestCode);
    let email = RwSignal::new(String::new());
    let otp = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let (busy, set_busy) = signal(false);
    let (error, set_error) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<String>::None);

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let client = match backend(ctx) {
            Ok(c) => c,
            Err(e) => return set_error.set(Some(e)),
        };
        let email_v = email.get_untracked().trim().to_string();
        let otp_v = otp.get_untracked().trim().to_string();
        let current = step.get_untracked();

        let check = match current {
            ResetStep::RequestCode => validate_email(&email_v),
            ResetStep::EnterCode => validate_otp(&otp_v),
            ResetStep::NewPassword => {
                validate_password(&password.get_untracked(), &confirm.get_untracked())
            }
            ResetStep::Done => return,
        };
        if let Err(e) = check {
            return set_error.set(Some(e.user_message()));
        }

        set_busy.set(true);
        leptos::task::spawn_local(async move {
            let result = match current {
                ResetStep::RequestCode => client
                    .forgot_password(&ForgotPasswordRequest { email: email_v })
                    .await
                    .map(|ack| (ResetStep::EnterCode, ack.message)),
                ResetStep::EnterCode => client
                    .validate_otp(&ValidateOtpRequest { email: email_v, otp: otp_v })
                    .await
                    .map(|ack| (ResetStep::NewPassword, ack.message)),
                ResetStep::NewPassword => client
                    .reset_password(&ResetPasswordRequest {
                        email: email_v,
                        otp: otp_v,
                        new_password: password.get_untracked(),
                    })
                    .await
                    .map(|ack| (ResetStep::Done, ack.message)),
                ResetStep::Done => Ok((ResetStep::Done, String::new())),
            };
            match result {
                Ok((next, message)) => {
                    set_error.set(None);
                    set_notice.set((!message.is_empty()).then_some(message));
                    step.set(next);
                }
                Err(e) => {
                    warn!("Password reset step {current:?} failed: {e}");
                    set_error.set(Some(e.user_message()));
                }
            }
            set_busy.set(false);
        });
    };

    view! {
        <div class="auth-page">
            <form class="auth-form" on:submit=submit>
                <h1>"Reset your password"</h1>
                <Banner error=error notice=notice/>
                {move || match step.get() {
                    ResetStep::RequestCode => view! {
                        <label>"Email"<input type="email" required bind:value=email/></label>
                        <button class="btn btn-primary" type="submit" disabled=move || busy.get()>"Send code"</button>
                    }.into_any(),
                    ResetStep::EnterCode => view! {
                        <p>"We emailed a 6-digit code to " {email.get_untracked()} "."</p>
                        <label>"Code"<input type="text" inputmode="numeric" maxlength="6" required bind:value=otp/></label>
                        <button class="btn btn-primary" type="submit" disabled=move || busy.get()>"Check code"</button>
                    }.into_any(),
                    ResetStep::NewPassword => view! {
                        <label>"New password"<input type="password" required bind:value=password/></label>
                        <label>"Confirm password"<input type="password" required bind:value=confirm/></label>
                        <button class="btn btn-primary" type="submit" disabled=move || busy.get()>"Save password"</button>
                    }.into_any(),
                    ResetStep::Done => view! {
                        <p>"Your password has been changed."</p>
                    }.into_any(),
                }}
                <p class="auth-links"><A href="/login">"Back to sign in"</A></p>
            </form>
        </div>
    }
}
