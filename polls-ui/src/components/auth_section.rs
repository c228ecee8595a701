use leptos::prelude::*;
use polls_app::domain::User;

#[component]
pub fn AuthSection(user: Option<User>) -> impl IntoView {
    match user {
        Some(user) => {
            let avatar = user.avatar_url.filter(|url| !url.is_empty());
            view! {
                <div class="auth-section auth-section--logged-in">
                    <div class="user-info">
                        {avatar.map(|src| view! { <img src=src alt="Avatar" class="user-info__avatar"/> })}
                        <div class="user-info__details">
                            <span class="user-info__name">{user.name}</span>
                            <span class="user-info__email">{user.email}</span>
                        </div>
                    </div>
                    <form action="/auth/logout" method="post" class="logout-form">
                        <button type="submit" class="logout-btn">"Logout"</button>
                    </form>
                </div>
            }
            .into_any()
        }
        None => view! {
            <div class="auth-section">
                <a href="/auth/login" class="login-btn">"Log in"</a>
                <p class="auth-section__hint">"Log in to vote on polls"</p>
            </div>
        }
        .into_any(),
    }
}
