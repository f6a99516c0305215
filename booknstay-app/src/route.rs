/// Top-level navigation: one screen at a time, no back stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    Splash,
    Login,
    Signup,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEvent {
    /// The splash screen observed the session exactly once.
    SplashFinished { signed_in: bool },
    SignedIn,
    SignedUp,
    GoToSignup,
    GoToLogin,
    SignedOut,
}

/// Pure routing table. Unknown combinations stay where they are, so a
/// stray event (say, a late splash timer) cannot derail navigation.
pub fn route(current: Route, event: RouteEvent) -> Route {
    match (current, event) {
        (Route::Splash, RouteEvent::SplashFinished { signed_in: true }) => Route::Home,
        (Route::Splash, RouteEvent::SplashFinished { signed_in: false }) => Route::Login,
        (Route::Login, RouteEvent::SignedIn) => Route::Home,
        (Route::Login, RouteEvent::GoToSignup) => Route::Signup,
        (Route::Signup, RouteEvent::SignedUp) => Route::Home,
        (Route::Signup, RouteEvent::GoToLogin) => Route::Login,
        (_, RouteEvent::SignedOut) => Route::Login,
        (current, _) => current,
    }
}
