/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的输入文件数量
    pub max_concurrent_files: usize,
    /// REVIGO 服务基础地址
    pub revigo_base_url: String,
    /// 输入文件存放目录（递归扫描）
    pub input_folder: String,
    /// 输入文件名后缀约定
    pub input_suffix: String,
    /// 状态轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 轮询超时上限（秒），0 表示不设上限
    pub poll_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 提交参数 ---
    pub cutoff: String,
    pub value_type: String,
    pub species_taxon: String,
    pub measure: String,
    // --- 外部协作方 ---
    /// 渲染脚本解释器命令
    pub rscript_command: String,
    /// 跨文件汇总图输出目录
    pub combined_graphics_folder: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_files: 3,
            revigo_base_url: "http://revigo.irb.hr".to_string(),
            input_folder: "output".to_string(),
            input_suffix: "IDs_Pvalues.txt".to_string(),
            poll_interval_ms: 1000,
            poll_timeout_secs: 0,
            verbose_logging: false,
            output_log_file: "revigo_output.txt".to_string(),
            cutoff: "0.7".to_string(),
            value_type: "pvalue".to_string(),
            species_taxon: "0".to_string(),
            measure: "SIMREL".to_string(),
            rscript_command: "Rscript".to_string(),
            combined_graphics_folder: "combined_graphics".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_files: std::env::var("MAX_CONCURRENT_FILES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_files),
            revigo_base_url: std::env::var("REVIGO_BASE_URL").unwrap_or(default.revigo_base_url),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            input_suffix: std::env::var("INPUT_SUFFIX").unwrap_or(default.input_suffix),
            poll_interval_ms: std::env::var("POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            poll_timeout_secs: std::env::var("POLL_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            cutoff: std::env::var("REVIGO_CUTOFF").unwrap_or(default.cutoff),
            value_type: std::env::var("REVIGO_VALUE_TYPE").unwrap_or(default.value_type),
            species_taxon: std::env::var("REVIGO_SPECIES_TAXON").unwrap_or(default.species_taxon),
            measure: std::env::var("REVIGO_MEASURE").unwrap_or(default.measure),
            rscript_command: std::env::var("RSCRIPT_COMMAND").unwrap_or(default.rscript_command),
            combined_graphics_folder: std::env::var("COMBINED_GRAPHICS_FOLDER").unwrap_or(default.combined_graphics_folder),
        }
    }
}
