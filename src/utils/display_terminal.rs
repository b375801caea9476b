//! 터미널 출력 포맷팅 유틸리티
//!
//! 서버 기동 과정에서 사용되는 터미널 출력 함수들을 제공합니다.

/// 박스 형태로 둘러싸인 제목을 출력합니다
///
/// ```text
/// ╔══════════════════════════════════════════════════╗
/// ║                 AUTH SERVICE                     ║
/// ╚══════════════════════════════════════════════════╝
/// ```
pub fn print_boxed_title(title: &str) {
    let content_width = 50;
    let border = "═".repeat(content_width);

    println!("╔{}╗", border);
    println!("║{:^50}║", title);
    println!("╚{}╝", border);
}

/// 진행 단계 시작을 표시합니다
///
/// ```text
/// → Step 1: Connecting credential store
/// ```
pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

/// 서브 작업의 상태를 표시합니다
///
/// ```text
///    ├─ Store: MongoDB
/// ```
pub fn print_sub_task(name: &str, status: &str) {
    println!("   ├─ {}: {}", name, status);
}

/// 기동 완료 요약을 출력합니다
pub fn print_startup_summary(bind_address: &str, store: &str, email_sender: &str) {
    println!();
    print_boxed_title("🎉 AUTH SERVICE READY");
    println!("   🌐 Listening: http://{}", bind_address);
    println!("   📦 Credential store: {}", store);
    println!("   ✉️  OTP delivery: {}", email_sender);
    println!();
}
