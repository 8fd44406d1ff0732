use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::post,
};
use chrono::Duration;
use otpauth_application::{
    OtpGenerator, RegisterUseCase, RequestOtpUseCase, ResetPasswordUseCase, SignInUseCase,
    VerifyAccountUseCase,
};
use otpauth_axum::routes::{
    request_reset_password, request_verify_code, reset_password, sign_in, sign_up, verify,
};
use otpauth_core::{
    AccountStore, EmailClient, PasswordHasher, SessionTokenStore, TokenIssuer,
    VerificationCodeStore,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// The assembled account lifecycle service.
///
/// Builds one use case per route and hands each route exactly the state it
/// needs. Stores, hasher, email client and token issuer implement `Clone`
/// (via internal `Arc`s or pooled handles), so cloning here is cheap.
pub struct AuthService {
    router: Router,
}

impl AuthService {
    pub fn new<S, H, E, T>(
        store: S,
        password_hasher: H,
        email_client: E,
        token_issuer: T,
        otp_ttl: Duration,
    ) -> Self
    where
        S: AccountStore + VerificationCodeStore + SessionTokenStore + Clone + 'static,
        H: PasswordHasher + Clone + 'static,
        E: EmailClient + Clone + 'static,
        T: TokenIssuer + Clone + 'static,
    {
        let otp_generator = OtpGenerator::default();

        let register = RegisterUseCase::new(
            store.clone(),
            password_hasher.clone(),
            email_client.clone(),
            otp_generator.clone(),
            otp_ttl,
        );
        let verify_account = VerifyAccountUseCase::new(store.clone());
        let request_otp =
            RequestOtpUseCase::new(store.clone(), email_client, otp_generator, otp_ttl);
        let reset = ResetPasswordUseCase::new(store.clone(), password_hasher.clone());
        let sign_in_use_case = SignInUseCase::new(store, password_hasher, token_issuer);

        let router = Router::new()
            .route("/sign-up", post(sign_up::<S, H, E>))
            .with_state(register)
            .route("/sign-in", post(sign_in::<S, H, T>))
            .with_state(sign_in_use_case)
            .route("/verify", post(verify::<S>))
            .with_state(verify_account)
            .route("/reset-password", post(reset_password::<S, H>))
            .with_state(reset)
            .route("/request/verify-code", post(request_verify_code::<S, E>))
            .with_state(request_otp.clone())
            .route(
                "/request/reset-password",
                post(request_reset_password::<S, E>),
            )
            .with_state(request_otp);

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Nest all routes under `/auth`, ready to mount into a larger app.
    pub fn as_nested_router(mut self, allowed_origins: Option<Vec<String>>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins
                            .iter()
                            .any(|allowed| origin.as_bytes() == allowed.as_bytes())
                    },
                ));

            self.router = self.router.layer(cors);
        }

        let service = self.with_trace_layer();
        Router::new().nest("/auth", service.router)
    }

    /// Run the service as a standalone server on the given listener.
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<Vec<String>>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_nested_router(allowed_origins);

        tracing::info!("Auth service listening on {}", listener.local_addr()?);

        axum_server::from_tcp(listener.into_std()?)?
            .serve(router.into_make_service())
            .await
    }
}
