use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repository::mock::MockAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

fn bench_login(c: &mut Criterion) {
    let tid = uuid::Uuid::new_v4();
    let repo = Arc::new(MockAuthRepository::with_tenant(tid));
    let svc = AuthService::new(repo, AuthConfig::new("bench-secret", 1));

    // register once, outside the measured loop
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.register(RegisterInput {
        tenant_id: tid,
        email: "bench@example.com".into(),
        name: "Bench".into(),
        password: "Benchmark1".into(),
    }))
    .unwrap();

    c.bench_function("auth_login_verify", |b| {
        b.iter(|| {
            let session = rt
                .block_on(svc.login(LoginInput {
                    tenant_id: tid,
                    email: "bench@example.com".into(),
                    password: "Benchmark1".into(),
                }))
                .unwrap();
            svc.verify_token(&session.token).unwrap();
        });
    });
}

criterion_group!(benches, bench_login);
criterion_main!(benches);
