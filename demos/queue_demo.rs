//! 分诊队列演示程序
//!
//! 展示队列的过滤、排序、统计以及与数据源的同步

use triage_core::utils::{sample_beds, sample_roster};
use triage_core::{BedStatus, PatientIntake, PatientStatus, Priority};
use triage_queue::{BedCriteria, QueueCriteria, QueueOrdering, SortDirection, SortKey};
use triage_sync::{MemoryRosterSource, QueueService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    println!("🚀 分诊队列演示\n");

    // 1. 从数据源拉取名册
    let source = MemoryRosterSource::with_patients(&sample_roster()).with_beds(&sample_beds());
    let mut service = QueueService::new(source);
    service.refresh().await;
    println!("✅ 已加载 {} 名患者", service.queue().len());

    // 2. 按科室过滤
    let emergency = QueueCriteria::new().with_department("Emergency");
    println!("\n🏥 急诊科患者:");
    for patient in service.view(&emergency, &QueueOrdering::default()) {
        println!("   - {} ({})", patient.name, patient.priority);
    }

    // 3. 按等待时间升序
    let by_wait = QueueOrdering::new(SortKey::WaitTime, SortDirection::Ascending);
    println!("\n⏱️ 按等待时间排序:");
    for patient in service.view(&QueueCriteria::default(), &by_wait) {
        println!("   - {} 等待 {} 分钟", patient.name, patient.wait_time);
    }

    // 4. 登记新患者并更新状态
    let patient = service
        .admit(PatientIntake::new("New Patient", Priority::Critical, "ICU"))
        .await?;
    println!("\n✅ 已登记 {} ({})", patient.name, patient.id);

    service.set_status("P-12345", PatientStatus::InProgress).await;
    if !service.set_status("P-unknown", PatientStatus::Completed).await {
        println!("⚠️ 未找到患者 P-unknown");
    }

    // 5. 统计
    let stats = service.stats();
    println!("\n📊 队列概览:");
    println!("   总患者数: {}", stats.total);
    println!("   候诊: {}", stats.count_by_status(PatientStatus::Waiting));
    println!("   就诊中: {}", stats.count_by_status(PatientStatus::InProgress));
    println!("   平均等待: {} 分钟", stats.rounded_average_wait());

    // 6. 床位
    service.refresh_beds().await;
    service.set_bed_status("B-1001", BedStatus::Occupied);
    println!("\n🛏️ 空闲床位:");
    for bed in service.bed_view(&BedCriteria::from_labels("", "All Wards", "Available")) {
        println!("   - {} ({})", bed.id, bed.department);
    }
    let beds = service.bed_stats();
    println!("   空闲 {} / 占用 {} / 维护 {}", beds.available(), beds.occupied(), beds.maintenance());

    println!("\n📝 存储中的记录: {}", serde_json::to_string_pretty(&service.queue().patients())?);

    Ok(())
}
