//! 分诊队列控制台主程序

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use triage_admin::{build_source, init_logging, ConfigManager};
use triage_core::{
    is_known_department, Bed, Patient, PatientIntake, PatientStatus, Priority, DEFAULT_DEPARTMENT,
};
use triage_queue::{BedCriteria, BedStats, QueueCriteria, QueueOrdering, QueueStats, SortDirection, SortKey};
use triage_sync::{QueueService, RosterSource};

/// 分诊控制台命令行参数
#[derive(Parser, Debug)]
#[command(name = "triage-console")]
#[command(about = "医院患者分诊队列控制台")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 显示过滤、排序后的队列
    Queue {
        /// 按姓名或ID搜索
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "All Departments")]
        department: String,
        #[arg(long, default_value = "All Priorities")]
        priority: String,
        #[arg(long, default_value = "All Status")]
        status: String,
        /// 排序字段: waitTime | priority
        #[arg(long)]
        sort: Option<String>,
        /// 排序方向: asc | desc
        #[arg(long)]
        direction: Option<String>,
    },
    /// 显示队列统计
    Stats,
    /// 登记新患者
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// 科室，不在登记表列表中时给出警告
        #[arg(long, default_value = DEFAULT_DEPARTMENT)]
        department: String,
        /// 指定患者ID，默认自动生成
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        contact_number: Option<String>,
        #[arg(long)]
        chief_complaint: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// 更新患者状态
    Status {
        id: String,
        status: PatientStatus,
    },
    /// 显示床位及占用情况
    Beds {
        /// 按床位ID、患者姓名或病区搜索
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "All Wards")]
        ward: String,
        #[arg(long, default_value = "All Status")]
        status: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_manager = ConfigManager::new(args.config.as_deref())?;
    let mut config = config_manager.get_config().await;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // 初始化日志
    init_logging(&config.logging)?;

    info!("启动分诊控制台...");
    info!("Configuration loaded from {}", config_manager.source_description());

    let source = build_source(&config.store)?;
    let mut service = QueueService::new(source);
    if !service.refresh().await {
        warn!("名册拉取失败，使用空名册继续");
    }

    match args.command {
        Command::Queue {
            search,
            department,
            priority,
            status,
            sort,
            direction,
        } => {
            let criteria = QueueCriteria::from_labels(&search, &department, &priority, &status);
            let defaults = config.queue.ordering();
            let ordering = QueueOrdering::new(
                sort.as_deref().map(SortKey::parse_or_default).unwrap_or(defaults.key),
                direction
                    .as_deref()
                    .map(SortDirection::parse_or_default)
                    .unwrap_or(defaults.direction),
            );

            print_queue(&service.view(&criteria, &ordering));
            print_stats(&service.stats());
        }
        Command::Stats => print_stats(&service.stats()),
        Command::Add {
            name,
            priority,
            department,
            id,
            age,
            gender,
            contact_number,
            chief_complaint,
            notes,
        } => {
            if !is_known_department(&department) {
                warn!("Department {} is not on the intake list", department);
            }
            let intake = PatientIntake {
                id,
                name,
                age,
                gender,
                contact_number,
                priority,
                department,
                chief_complaint,
                notes,
            };
            let patient = service.admit(intake).await.context("登记患者失败")?;
            println!("✅ 已登记患者 {} ({})", patient.name, patient.id);
        }
        Command::Status { id, status } => {
            if service.set_status(&id, status).await {
                println!("✅ 患者 {} 状态已更新为 {}", id, status);
            } else {
                println!("⚠️ 未找到患者 {}", id);
            }
        }
        Command::Beds { search, ward, status } => {
            if !service.refresh_beds().await {
                warn!("床位拉取失败");
            }
            let criteria = BedCriteria::from_labels(&search, &ward, &status);
            print_beds(&service.bed_view(&criteria));
            print_bed_stats(&service.bed_stats());
        }
    }

    info!("数据源: {}", service.source().name());
    Ok(())
}

fn print_queue(patients: &[&Patient]) {
    println!("📋 患者队列 ({} 人)", patients.len());
    println!(
        "{:<10} {:<20} {:<10} {:<26} {:<10} {:<12} {:>6}",
        "ID", "姓名", "优先级", "科室", "到达", "状态", "等待"
    );
    for patient in patients {
        println!(
            "{:<10} {:<20} {:<10} {:<26} {:<10} {:<12} {:>4}分钟",
            patient.id,
            patient.name,
            patient.priority,
            patient.department,
            patient.arrival_time,
            patient.status,
            patient.wait_time
        );
    }
}

fn print_stats(stats: &QueueStats) {
    println!("\n📊 队列概览:");
    println!("   总患者数: {}", stats.total);
    println!("   候诊: {}", stats.count_by_status(PatientStatus::Waiting));
    println!("   就诊中: {}", stats.count_by_status(PatientStatus::InProgress));
    match stats.average_wait_minutes {
        Some(_) => println!("   平均等待: {} 分钟", stats.rounded_average_wait()),
        None => println!("   平均等待: 无数据"),
    }
}

fn print_beds(beds: &[&Bed]) {
    println!("🛏️ 床位 ({} 张)", beds.len());
    println!("{:<8} {:<14} {:<12} {:<20} {:<10}", "床位", "病区", "状态", "患者", "入院");
    for bed in beds {
        println!(
            "{:<8} {:<14} {:<12} {:<20} {:<10}",
            bed.id,
            bed.department,
            bed.status,
            bed.patient_name.as_deref().unwrap_or("-"),
            bed.admission_time.as_deref().unwrap_or("-")
        );
    }
}

fn print_bed_stats(stats: &BedStats) {
    println!("\n📊 床位概览:");
    println!("   总床位: {}", stats.total);
    println!("   空闲: {}", stats.available());
    println!("   占用: {}", stats.occupied());
    println!("   维护: {}", stats.maintenance());
}
