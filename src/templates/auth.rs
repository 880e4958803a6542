//! Login, sign-up, and password reset forms.
//!
//! Each form posts JSON to its `/api/auth/*` endpoint with `fetch` and
//! stays editable on failure, showing per-field errors and a general one.

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

struct Field {
    name: &'static str,
    kind: &'static str,
    placeholder: &'static str,
}

struct AuthForm {
    heading: &'static str,
    endpoint: &'static str,
    submit: &'static str,
    fallback_error: &'static str,
    fields: &'static [Field],
    links: &'static str,
    /// Where to go after success; `None` shows the server message instead.
    redirect: Option<&'static str>,
}

const LOGIN: AuthForm = AuthForm {
    heading: "Welcome back",
    endpoint: "/api/auth/login",
    submit: "Sign in",
    fallback_error: "Login failed",
    fields: &[
        Field { name: "email", kind: "email", placeholder: "Email" },
        Field { name: "password", kind: "password", placeholder: "Password" },
    ],
    links: r#"<a href="/forgot-password">Forgot password?</a> · <a href="/signup">Create an account</a>"#,
    redirect: Some("/"),
};

const SIGNUP: AuthForm = AuthForm {
    heading: "Create account",
    endpoint: "/api/auth/signup",
    submit: "Sign up",
    fallback_error: "Signup failed",
    fields: &[
        Field { name: "name", kind: "text", placeholder: "Full name" },
        Field { name: "email", kind: "email", placeholder: "Email" },
        Field { name: "password", kind: "password", placeholder: "Password" },
        Field { name: "confirmPassword", kind: "password", placeholder: "Confirm password" },
    ],
    links: r#"Already registered? <a href="/login">Sign in</a>"#,
    redirect: None,
};

const FORGOT: AuthForm = AuthForm {
    heading: "Reset password",
    endpoint: "/api/auth/forgot-password",
    submit: "Send reset link",
    fallback_error: "Failed to send reset email",
    fields: &[Field { name: "email", kind: "email", placeholder: "Email" }],
    links: r#"<a href="/login">Back to sign in</a>"#,
    redirect: None,
};

pub fn login_form() -> String {
    render(&LOGIN)
}

pub fn signup_form() -> String {
    render(&SIGNUP)
}

pub fn forgot_password_form() -> String {
    render(&FORGOT)
}

fn render(form: &AuthForm) -> String {
    let inputs: String = form
        .fields
        .iter()
        .map(|f| {
            format!(
                r#"<div class="field">
                    <input type="{kind}" name="{name}" placeholder="{placeholder}">
                    <div class="field-error" data-error-for="{name}"></div>
                </div>"#,
                kind = f.kind,
                name = f.name,
                placeholder = f.placeholder,
            )
        })
        .collect();

    let on_success = match form.redirect {
        Some(path) => format!("window.location.href = '{}';", path),
        None => "showMessage(data.message || 'Done.', 'success'); formEl.reset();".to_string(),
    };

    format!(
        r##"<div class="auth-form">
            <h1>{heading}</h1>
            <div class="message hidden" id="form-message"></div>
            <form id="auth-form" novalidate>
                {inputs}
                <button type="submit" id="auth-submit">{submit}</button>
            </form>
            <div class="links">{links}</div>
        </div>
    <script>
        const formEl = document.getElementById('auth-form');

        function showMessage(text, kind) {{
            const box = document.getElementById('form-message');
            box.textContent = text;
            box.className = 'message ' + kind;
        }}

        function clearErrors() {{
            document.querySelectorAll('[data-error-for]').forEach(el => el.textContent = '');
            document.getElementById('form-message').className = 'message hidden';
        }}

        function showFieldErrors(errors) {{
            Object.entries(errors || {{}}).forEach(([name, text]) => {{
                const el = document.querySelector('[data-error-for="' + name + '"]');
                if (el) el.textContent = text;
            }});
        }}

        formEl.addEventListener('submit', async (e) => {{
            e.preventDefault();
            clearErrors();

            const payload = Object.fromEntries(new FormData(formEl).entries());
            const button = document.getElementById('auth-submit');
            button.disabled = true;

            try {{
                const response = await fetch('{endpoint}', {{
                    method: 'POST',
                    headers: {{ 'Content-Type': 'application/json' }},
                    body: JSON.stringify(payload)
                }});
                const data = await response.json();

                if (response.ok && data.success) {{
                    {on_success}
                }} else {{
                    showFieldErrors(data.errors);
                    showMessage(data.message || '{fallback}', 'error');
                }}
            }} catch (error) {{
                showMessage('{network}', 'error');
            }} finally {{
                button.disabled = false;
            }}
        }});
    </script>"##,
        heading = form.heading,
        inputs = inputs,
        submit = form.submit,
        links = form.links,
        endpoint = form.endpoint,
        on_success = on_success,
        fallback = form.fallback_error,
        network = NETWORK_ERROR_MESSAGE,
    )
}
