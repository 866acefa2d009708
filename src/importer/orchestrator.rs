// ==========================================
// 机器人设备数据导入系统 - 导入编排器
// ==========================================
// 职责: 驱动导入管道状态机，汇总计数并写入审计
// 流程: RECEIVED → FILE_VALIDATED → PARSED → SANITIZED → VALIDATED
//       → (VALIDATE_ONLY_DONE | PERSISTING → PERSISTED) → AUDITED → DONE
//       任意阶段结构性失败 → ABORTED
// 红线: 从不向调用方抛出原始错误；审计失败不影响返回结果
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::settings::{ImportSettings, DEFAULT_PARALLELISM};
use crate::domain::audit::{audit_file_name, AuditEntry, SYSTEM_ACTOR};
use crate::domain::report::{ErrorCode, ImportReport, ImportRequest, ValidationError};
use crate::domain::row::{remap_fields, NormalizedRow};
use crate::domain::types::{AuditStatus, EntityKind, ImportStatus, OperationType};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{Sanitizer, Transformer};
use crate::importer::processor_registry::{file_extension, ProcessorRegistry};
use crate::importer::sanitizer::MarkupSanitizer;
use crate::importer::transformer::EntityTransformer;
use crate::importer::validator::{row_number, ValidationEngine, ValidationOptions};
use crate::repository::audit_sink::AuditSink;
use crate::repository::record_store::RecordStore;
use chrono::{NaiveDateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PipelineState - 管道状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Received,
    FileValidated,
    Parsed,
    Sanitized,
    Validated,
    ValidateOnlyDone,
    Persisting,
    Persisted,
    Audited,
    Done,
    Aborted,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "RECEIVED",
            PipelineState::FileValidated => "FILE_VALIDATED",
            PipelineState::Parsed => "PARSED",
            PipelineState::Sanitized => "SANITIZED",
            PipelineState::Validated => "VALIDATED",
            PipelineState::ValidateOnlyDone => "VALIDATE_ONLY_DONE",
            PipelineState::Persisting => "PERSISTING",
            PipelineState::Persisted => "PERSISTED",
            PipelineState::Audited => "AUDITED",
            PipelineState::Done => "DONE",
            PipelineState::Aborted => "ABORTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Aborted)
    }

    /// 状态迁移表
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;

        if next == Aborted {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Received, FileValidated)
                | (FileValidated, Parsed)
                | (Parsed, Sanitized)
                | (Sanitized, Validated)
                | (Validated, ValidateOnlyDone)
                | (Validated, Persisting)
                | (Persisting, Persisted)
                | (ValidateOnlyDone, Audited)
                | (Persisted, Audited)
                | (Audited, Done)
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// 单次调用的运行上下文（调用结束即丢弃）
struct RunContext {
    run_id: String,
    state: PipelineState,
    started: Instant,
    created_at: NaiveDateTime,
    audit_enabled: bool,
}

impl RunContext {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            state: PipelineState::Received,
            started: Instant::now(),
            created_at: Utc::now().naive_utc(),
            audit_enabled: true,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        if !self.state.can_transition_to(next) {
            warn!(run_id = %self.run_id, from = %self.state, to = %next, "非法状态迁移");
        }
        debug!(run_id = %self.run_id, from = %self.state, to = %next, "状态迁移");
        self.state = next;
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

// 管道结果（审计前）
struct RunOutcome {
    report: ImportReport,
    audit_status: AuditStatus,
    error_message: Option<String>,
}

impl RunOutcome {
    fn from_report(report: ImportReport) -> Self {
        let audit_status = AuditStatus::from(report.status);
        Self {
            report,
            audit_status,
            error_message: None,
        }
    }
}

// 落库阶段计数
#[derive(Debug, Default)]
struct PersistTally {
    successful: i64,
    failed: i64,
    transform_errors: Vec<ValidationError>,
    halted_by: Option<String>,
    persistence_error: Option<String>,
}

// ==========================================
// ImportOrchestrator - 导入编排器
// ==========================================
pub struct ImportOrchestrator {
    // 协作方
    store: Arc<dyn RecordStore>,
    audit_sink: Arc<dyn AuditSink>,
    config: Arc<dyn ImportConfigReader>,

    // 管道组件
    registry: ProcessorRegistry,
    sanitizer: Box<dyn Sanitizer>,
    transformer: Box<dyn Transformer>,
}

impl ImportOrchestrator {
    /// 使用内置处理器、清洗器与转换器创建编排器
    ///
    /// # 参数
    /// - store: 记录存储
    /// - audit_sink: 审计输出
    /// - config: 配置读取器
    pub fn new(
        store: Arc<dyn RecordStore>,
        audit_sink: Arc<dyn AuditSink>,
        config: Arc<dyn ImportConfigReader>,
    ) -> Self {
        Self::with_components(
            store,
            audit_sink,
            config,
            ProcessorRegistry::with_defaults(),
            Box::new(MarkupSanitizer::new()),
            Box::new(EntityTransformer::new()),
        )
    }

    /// 指定全部组件创建编排器
    pub fn with_components(
        store: Arc<dyn RecordStore>,
        audit_sink: Arc<dyn AuditSink>,
        config: Arc<dyn ImportConfigReader>,
        registry: ProcessorRegistry,
        sanitizer: Box<dyn Sanitizer>,
        transformer: Box<dyn Transformer>,
    ) -> Self {
        Self {
            store,
            audit_sink,
            config,
            registry,
            sanitizer,
            transformer,
        }
    }

    /// 导入（或仅校验）一个文件
    ///
    /// # 参数
    /// - bytes: 文件原始字节
    /// - request: 导入请求
    ///
    /// # 返回
    /// - ImportReport: 总是结构化报告，从不返回原始错误
    #[instrument(
        skip_all,
        fields(
            run_id = tracing::field::Empty,
            file_name = %request.file_name,
            entity_kind = %request.entity_kind,
            validate_only = request.validate_only
        )
    )]
    pub async fn import_data(&self, bytes: &[u8], request: &ImportRequest) -> ImportReport {
        let mut ctx = RunContext::new();
        tracing::Span::current().record("run_id", ctx.run_id.as_str());
        info!(run_id = %ctx.run_id, size = bytes.len(), "开始导入");

        let outcome = match self.execute(&mut ctx, bytes, request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if !ctx.state.is_terminal() {
                    ctx.advance(PipelineState::Aborted);
                }
                if e.is_structural() {
                    warn!(run_id = %ctx.run_id, error = %e, "文件无法处理，导入中止");
                } else {
                    error!(run_id = %ctx.run_id, error = %e, "导入管道异常中止");
                }
                RunOutcome {
                    report: ImportReport::error(format!("导入失败: {}", e)),
                    audit_status: AuditStatus::Failure,
                    error_message: Some(e.to_string()),
                }
            }
        };

        let mut report = outcome.report;
        report.processing_time_ms = ctx.elapsed_ms();

        self.write_audit(&ctx, request, &report, outcome.audit_status, outcome.error_message)
            .await;
        if !ctx.state.is_terminal() {
            ctx.advance(PipelineState::Audited);
            ctx.advance(PipelineState::Done);
        }

        info!(
            run_id = %ctx.run_id,
            status = %report.status,
            total = report.total_records,
            successful = report.successful_records,
            failed = report.failed_records,
            elapsed_ms = report.processing_time_ms,
            final_state = %ctx.state,
            "导入结束"
        );
        report
    }

    /// 仅校验（不落库）
    pub async fn validate_data(&self, bytes: &[u8], request: &ImportRequest) -> ImportReport {
        let request = request.clone().validate_only();
        self.import_data(bytes, &request).await
    }

    /// 并发导入多个相互独立的文件，按输入顺序返回报告
    ///
    /// 并发上限取配置的并行度提示
    pub async fn import_many(&self, jobs: Vec<(Vec<u8>, ImportRequest)>) -> Vec<ImportReport> {
        let parallelism = match self.config.get_parallelism().await {
            Ok(n) => n.max(1),
            Err(e) => {
                warn!(error = %e, "并行度配置读取失败，使用默认值");
                DEFAULT_PARALLELISM
            }
        };
        info!(count = jobs.len(), parallelism = parallelism, "开始批量导入文件");

        let reports: Vec<ImportReport> = stream::iter(jobs)
            .map(|(bytes, request)| async move { self.import_data(&bytes, &request).await })
            .buffered(parallelism)
            .collect()
            .await;

        info!(
            total = reports.len(),
            failed = reports
                .iter()
                .filter(|r| matches!(r.status, ImportStatus::Error | ImportStatus::Failure))
                .count(),
            "批量导入完成"
        );
        reports
    }

    // ==========================================
    // 管道主体
    // ==========================================

    async fn execute(
        &self,
        ctx: &mut RunContext,
        bytes: &[u8],
        request: &ImportRequest,
    ) -> ImportResult<RunOutcome> {
        // === 步骤 1: 加载配置 + 文件校验 ===
        let settings = self.config.load_settings().await?;
        ctx.audit_enabled = settings.enable_audit_logging;

        let extension = check_file(bytes, &request.file_name, &settings)?;
        ctx.advance(PipelineState::FileValidated);

        // === 步骤 2: 选择处理器并解析 ===
        let processor = self
            .registry
            .select(&extension)
            .ok_or_else(|| ImportError::UnsupportedFormat(extension.clone()))?;
        let rows = processor.parse(bytes)?;
        let mut rows: Vec<NormalizedRow> = if request.field_mappings.is_empty() {
            rows
        } else {
            rows.into_iter()
                .map(|row| remap_fields(row, &request.field_mappings))
                .collect()
        };
        info!(run_id = %ctx.run_id, processor = processor.name(), rows = rows.len(), "文件解析完成");
        ctx.advance(PipelineState::Parsed);

        // === 步骤 3: 清洗 ===
        if settings.enable_input_sanitization {
            let changed = self.sanitizer.sanitize_rows(&mut rows);
            debug!(run_id = %ctx.run_id, changed_cells = changed, "输入清洗完成");
        }
        ctx.advance(PipelineState::Sanitized);

        // === 步骤 4: 校验 ===
        let engine = ValidationEngine::new(ValidationOptions::from(&settings));
        let validation = engine
            .validate(&rows, &request.entity_kind, self.store.as_ref())
            .await?;
        info!(
            run_id = %ctx.run_id,
            rows = rows.len(),
            errors = validation.errors.len(),
            "校验完成"
        );
        ctx.advance(PipelineState::Validated);

        if request.validate_only {
            ctx.advance(PipelineState::ValidateOnlyDone);
            return Ok(RunOutcome::from_report(validation));
        }

        let skip_errors = request.skip_errors.unwrap_or(settings.skip_errors_default);
        let kind = EntityKind::parse(&request.entity_kind);
        let kind = match kind {
            Some(kind) if !validation.has_errors() || skip_errors => kind,
            _ => {
                // 未知类别或严格模式下存在校验错误: 不落库
                warn!(
                    run_id = %ctx.run_id,
                    errors = validation.errors.len(),
                    skip_errors = skip_errors,
                    "校验未通过，导入中止"
                );
                ctx.advance(PipelineState::Aborted);
                let error_message = Some(validation.message.clone());
                return Ok(RunOutcome {
                    report: validation,
                    audit_status: AuditStatus::ValidationFailed,
                    error_message,
                });
            }
        };

        // === 步骤 5: 分批转换 + 落库 ===
        ctx.advance(PipelineState::Persisting);
        let batch_size = settings.effective_batch_size(request.batch_size);
        let tally = self
            .persist(ctx, &rows, kind, &validation.errors, skip_errors, batch_size)
            .await;

        let total = rows.len() as i64;
        let mut errors = validation.errors;
        errors.extend(tally.transform_errors);

        if let Some(detail) = tally.persistence_error {
            ctx.advance(PipelineState::Aborted);
            let message = format!("持久化失败: {}", detail);
            return Ok(RunOutcome {
                report: ImportReport {
                    status: ImportStatus::Failure,
                    message: message.clone(),
                    total_records: total,
                    successful_records: tally.successful,
                    failed_records: tally.failed,
                    errors,
                    processing_time_ms: 0,
                },
                audit_status: AuditStatus::Failure,
                error_message: Some(message),
            });
        }

        ctx.advance(PipelineState::Persisted);
        let status = ImportStatus::from_counts(tally.successful, tally.failed);
        let message = match &tally.halted_by {
            Some(detail) => format!(
                "转换失败，导入已中止: {}（成功 {} 条，失败 {} 条）",
                detail, tally.successful, tally.failed
            ),
            None => format!(
                "导入完成: 成功 {} 条，失败 {} 条",
                tally.successful, tally.failed
            ),
        };

        Ok(RunOutcome {
            report: ImportReport {
                status,
                message,
                total_records: total,
                successful_records: tally.successful,
                failed_records: tally.failed,
                errors,
                processing_time_ms: 0,
            },
            audit_status: AuditStatus::from(status),
            error_message: tally.halted_by,
        })
    }

    /// 按批次顺序转换并保存
    ///
    /// 计数恒满足 successful + failed = rows.len()
    async fn persist(
        &self,
        ctx: &RunContext,
        rows: &[NormalizedRow],
        kind: EntityKind,
        validation_errors: &[ValidationError],
        skip_errors: bool,
        batch_size: usize,
    ) -> PersistTally {
        let total = rows.len() as i64;
        let error_rows: HashSet<usize> = if skip_errors {
            validation_errors.iter().map(|e| e.row).collect()
        } else {
            HashSet::new()
        };

        let mut tally = PersistTally::default();
        for (batch_index, chunk) in rows.chunks(batch_size.max(1)).enumerate() {
            let base = batch_index * batch_size.max(1);
            let mut entities = Vec::with_capacity(chunk.len());

            for (offset, row) in chunk.iter().enumerate() {
                let row_no = row_number(base + offset);
                if error_rows.contains(&row_no) {
                    tally.failed += 1;
                    continue;
                }

                match self.transformer.transform(row, kind, row_no) {
                    Ok(entity) => entities.push(entity),
                    Err(e) => {
                        warn!(run_id = %ctx.run_id, row = row_no, error = %e, "行转换失败");
                        tally.failed += 1;
                        tally.transform_errors.push(transform_error(row_no, &e));
                        if !skip_errors {
                            tally.halted_by = Some(e.to_string());
                            break;
                        }
                    }
                }
            }

            // 已转换的实体先落库，再处理中止
            if !entities.is_empty() {
                let submitted = entities.len() as i64;
                match self.store.save_batch(kind, entities).await {
                    Ok(saved) => {
                        let saved = (saved as i64).min(submitted);
                        tally.successful += saved;
                        tally.failed += submitted - saved;
                        if saved < submitted {
                            warn!(
                                run_id = %ctx.run_id,
                                batch = batch_index + 1,
                                submitted = submitted,
                                saved = saved,
                                "批次部分保存"
                            );
                        } else {
                            debug!(run_id = %ctx.run_id, batch = batch_index + 1, saved = saved, "批次保存完成");
                        }
                    }
                    Err(e) => {
                        error!(run_id = %ctx.run_id, batch = batch_index + 1, error = %e, "批次保存失败");
                        tally.persistence_error = Some(e.to_string());
                        tally.failed = total - tally.successful;
                        break;
                    }
                }
            }

            if tally.halted_by.is_some() {
                tally.failed = total - tally.successful;
                break;
            }
        }

        tally
    }

    async fn write_audit(
        &self,
        ctx: &RunContext,
        request: &ImportRequest,
        report: &ImportReport,
        status: AuditStatus,
        error_message: Option<String>,
    ) {
        if !ctx.audit_enabled {
            debug!(run_id = %ctx.run_id, "审计已关闭，跳过写入");
            return;
        }

        let entry = AuditEntry {
            audit_id: ctx.run_id.clone(),
            operation_type: if request.validate_only {
                OperationType::Validation
            } else {
                OperationType::Import
            },
            entity_kind: request.entity_kind.clone(),
            actor_id: request
                .actor_id
                .clone()
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| SYSTEM_ACTOR.to_string()),
            source_file_name: audit_file_name(&request.file_name),
            records_processed: report.total_records,
            records_successful: report.successful_records,
            records_failed: report.failed_records,
            processing_time_ms: report.processing_time_ms,
            status,
            error_message,
            created_at: ctx.created_at,
        };

        if let Err(e) = self.audit_sink.write(entry).await {
            error!(run_id = %ctx.run_id, error = %e, "审计写入失败");
        }
    }
}

/// 文件级校验: 非空、大小、扩展名白名单
///
/// # 返回
/// - Ok(String): 小写扩展名
fn check_file(bytes: &[u8], file_name: &str, settings: &ImportSettings) -> ImportResult<String> {
    if file_name.trim().is_empty() {
        return Err(ImportError::EmptyFile("文件名缺失".to_string()));
    }
    if bytes.is_empty() {
        return Err(ImportError::EmptyFile(file_name.to_string()));
    }

    let max = settings.max_upload_bytes();
    if bytes.len() > max {
        return Err(ImportError::FileTooLarge {
            size: bytes.len(),
            max,
        });
    }

    let extension = file_extension(file_name)
        .ok_or_else(|| ImportError::UnsupportedFormat(file_name.to_string()))?;
    if !settings.is_extension_allowed(&extension) {
        return Err(ImportError::UnsupportedFormat(extension));
    }
    Ok(extension)
}

fn transform_error(row: usize, err: &ImportError) -> ValidationError {
    let field = match err {
        ImportError::MissingField { field, .. } => field.as_str(),
        _ => "row",
    };
    ValidationError::new(
        row,
        field,
        ErrorCode::TransformFailed,
        err.to_string(),
        None,
        None,
    )
}
