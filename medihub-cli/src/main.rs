//! MediHub命令行程序

mod render;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use medihub_admin::{init_logging, ConfigManager, MediHubConfig, StoreMode};
use medihub_core::{
    utils, ActivityDraft, ActivityType, MedicalStatus, PatientDraft, PatientPatch, PatientStatus,
    RecordId,
};
use medihub_services::{Latency, Services};
use medihub_store::{MockStore, RecordStore, RemoteSettings, RemoteStore};
use medihub_views::{
    DashboardView, DetailTab, DetailView, Pages, PatientsView, ViewSettings,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// MediHub命令行参数
#[derive(Parser, Debug)]
#[command(name = "medihub")]
#[command(about = "MediHub 医院管理仪表盘")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    /// 强制使用内存模拟数据
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 仪表盘：指标和最近活动
    Dashboard,

    /// 患者列表
    Patients {
        /// 按姓名、ID、医生或状态搜索
        #[arg(short, long)]
        search: Option<String>,

        /// 页码
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// 患者详情
    Patient {
        id: RecordId,

        /// overview, history, treatment, medications, labs, notes
        #[arg(short, long, default_value = "overview")]
        tab: String,

        #[command(flatten)]
        edit: EditArgs,
    },

    /// 新患者入院
    Admit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        doctor: String,
        #[arg(long, default_value = "")]
        room: String,
        /// 逗号分隔，如 "Penicillin, Peanuts"
        #[arg(long, default_value = "")]
        allergies: String,
        #[arg(long, default_value = "Admitted")]
        status: String,
    },

    /// 活动记录
    Activities {
        /// 只显示最近N条
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 打印生效配置
    Config,
}

/// 修改患者信息，给出任一项即保存
#[derive(clap::Args, Debug)]
struct EditArgs {
    /// 病房
    #[arg(long)]
    set_room: Option<String>,

    /// Admitted, Discharged, Emergency, Outpatient
    #[arg(long)]
    set_status: Option<String>,

    /// Stable, Monitoring, Critical
    #[arg(long)]
    set_condition: Option<String>,

    /// 主治医生
    #[arg(long)]
    set_doctor: Option<String>,
}

impl EditArgs {
    fn into_patch(self) -> Result<PatientPatch> {
        let status = self
            .set_status
            .map(|s| PatientStatus::parse(&s).with_context(|| format!("Unknown patient status '{}'", s)))
            .transpose()?;
        let medical_status = self
            .set_condition
            .map(|s| MedicalStatus::parse(&s).with_context(|| format!("Unknown condition '{}'", s)))
            .transpose()?;
        Ok(PatientPatch {
            room: self.set_room,
            status,
            medical_status,
            assigned_doctor: self.set_doctor,
            ..Default::default()
        })
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut manager = ConfigManager::load(args.config.as_deref())?;
    manager.update(|config| {
        if let Some(level) = &args.log_level {
            config.logging.level = level.clone();
        }
        if args.mock {
            config.store.mode = StoreMode::Mock;
        }
    })?;
    let config = manager.config().clone();

    init_logging(&config.logging)?;

    if let Command::Config = args.command {
        print!("{}", manager.to_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let services = build_services(&config)?;
    let pages = Pages::new(
        &services,
        ViewSettings {
            page_size: config.views.page_size,
            recent_activity_limit: config.views.recent_activity_limit,
        },
    );

    let ok = run(args.command, &services, &pages).await?;

    let toasts = pages.notifications.drain().await;
    if !toasts.is_empty() {
        eprint!("{}", render::notifications(&toasts));
    }

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// 按配置创建存储和服务
fn build_services(config: &MediHubConfig) -> Result<Services> {
    let (store, latency): (Arc<dyn RecordStore>, Latency) = match config.store.mode {
        StoreMode::Mock => {
            info!("使用内存模拟数据");
            let latency = if config.latency.enabled {
                Latency::simulated()
            } else {
                Latency::none()
            };
            (Arc::new(MockStore::seeded()), latency)
        }
        StoreMode::Remote => {
            let remote = &config.store.remote;
            info!("连接远程记录服务: {}", remote.endpoint);
            let store = RemoteStore::new(RemoteSettings {
                endpoint: remote.endpoint.clone(),
                project_id: remote.project_id.clone(),
                public_key: remote.public_key.clone(),
                timeout: remote.timeout(),
            })
            .context("Failed to create remote store")?;
            (Arc::new(store), Latency::none())
        }
    };

    Ok(Services::new(store, latency))
}

/// 执行命令并输出，返回页面是否成功
async fn run(command: Command, services: &Services, pages: &Pages) -> Result<bool> {
    let now = Utc::now();

    match command {
        Command::Dashboard => {
            pages.dashboard.load().await;
            let view = pages.dashboard.view().await;
            print!("{}", render::dashboard(&view, now));
            Ok(!matches!(view, DashboardView::Failed { .. }))
        }

        Command::Patients { search, page } => {
            pages.patients.load().await;
            if let Some(term) = search {
                pages.patients.search(&term).await;
            }
            pages.patients.go_to_page(page).await;

            let view = pages.patients.view().await;
            print!("{}", render::patients(&view));
            Ok(!matches!(view, PatientsView::Failed { .. }))
        }

        Command::Patient { id, tab, edit } => {
            let tab = DetailTab::parse(&tab)
                .with_context(|| format!("Unknown tab '{}'", tab))?;
            let patch = edit.into_patch()?;
            pages.patient_detail.load(id).await;
            pages.patient_detail.select_tab(tab).await;

            // 加载失败时无法编辑，直接渲染错误页
            let detail = &pages.patient_detail;
            if !patch.is_empty() && detail.begin_edit().await.is_ok() {
                detail.edit(patch).await?;
                if let Err(e) = detail.save().await {
                    error!("保存患者 {} 失败: {}", id, e);
                    detail.cancel_edit().await;
                    print!("{}", render::patient_detail(&detail.view().await));
                    return Ok(false);
                }
            }

            let view = detail.view().await;
            print!("{}", render::patient_detail(&view));
            Ok(!matches!(view, DetailView::Failed { .. }))
        }

        Command::Admit {
            name,
            age,
            gender,
            doctor,
            room,
            allergies,
            status,
        } => {
            let status = PatientStatus::parse(&status)
                .with_context(|| format!("Unknown patient status '{}'", status))?;
            let draft = PatientDraft {
                name,
                age,
                gender,
                assigned_doctor: doctor,
                status: Some(status),
                allergies: utils::split_list(&allergies),
                room,
                ..Default::default()
            };

            let patient = match services.patients.create(draft).await {
                Ok(patient) => patient,
                Err(e) => {
                    error!("入院登记失败: {}", e);
                    eprintln!("Failed to admit patient: {}", e.message());
                    return Ok(false);
                }
            };

            let activity = ActivityDraft {
                activity_type: ActivityType::Admission,
                patient_name: patient.name.clone(),
                patient_id: Some(patient.id),
                description: format!("admitted under {}", patient.assigned_doctor),
                timestamp: patient.admission_date,
                doctor: patient.assigned_doctor.clone(),
            };
            if let Err(e) = services.activities.create(activity).await {
                // 活动写入失败不回滚已创建的患者
                error!("Failed to record admission activity: {}", e);
            }

            println!("Admitted {} as patient #{}", patient.name, patient.id);
            Ok(true)
        }

        Command::Activities { limit } => {
            let result = match limit {
                Some(limit) => services.activities.get_recent(limit).await,
                None => services.activities.get_all().await,
            };
            match result {
                Ok(activities) => {
                    print!("{}", render::activities(&activities, now));
                    Ok(true)
                }
                Err(e) => {
                    eprintln!("Failed to load activities: {}", e.message());
                    Ok(false)
                }
            }
        }

        // 已在加载服务之前处理
        Command::Config => Ok(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patient_edit_flags_build_patch() {
        let args = Args::try_parse_from([
            "medihub",
            "patient",
            "3",
            "--set-room",
            "ICU-2",
            "--set-status",
            "emergency",
            "--set-condition",
            "Critical",
        ])
        .unwrap();

        let Command::Patient { id, edit, .. } = args.command else {
            panic!("expected patient command");
        };
        assert_eq!(id, 3);
        let patch = edit.into_patch().unwrap();
        assert_eq!(patch.room.as_deref(), Some("ICU-2"));
        assert_eq!(patch.status, Some(PatientStatus::Emergency));
        assert_eq!(patch.medical_status, Some(MedicalStatus::Critical));
        assert!(patch.assigned_doctor.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let args = Args::try_parse_from(["medihub", "patient", "3", "--set-status", "Sleeping"]).unwrap();
        let Command::Patient { edit, .. } = args.command else {
            panic!("expected patient command");
        };
        assert!(edit.into_patch().is_err());
    }
}
