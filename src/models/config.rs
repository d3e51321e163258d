use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::models::layout::LayoutGeometry;

/// Maximum number of location or pallet codes generated at once.
pub const MAX_GENERATED_CODES: usize = 1000;

/// Maximum length of a location code prefix.
pub const MAX_LOCATION_PREFIX_LEN: usize = 10;

/// Maximum number of files a single merge accepts.
pub const MAX_MERGE_FILES: usize = 10;

/// Default base text for PDF417 groups.
pub const DEFAULT_PDF417_BASE: &str =
    "V3,SSCC001959494854252373,GTIN00194252099230,SCC30194252099231,{Part Number},{QTY Info},";

/// User configuration from `labelkit Settings.yaml`
///
/// Holds the defaults every tool starts from when a job does not override them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Labelkit_Settings", default)]
    pub settings: ToolSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    #[serde(rename = "Output Directory", default = "default_output_dir")]
    pub output_dir: String,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Render Batch Size", default = "default_render_batch_size")]
    pub render_batch_size: usize,

    #[serde(rename = "Serial Sheet", default)]
    pub serial_sheet: SerialSheetConfig,

    #[serde(rename = "PDF417 Sheet", default)]
    pub pdf417_sheet: Pdf417SheetConfig,

    #[serde(rename = "Location Sheet", default)]
    pub location_sheet: LocationSheetConfig,

    #[serde(rename = "Pallet Sheet", default)]
    pub pallet_sheet: PalletSheetConfig,

    #[serde(rename = "Random Strings", default)]
    pub random_strings: RandomStringsConfig,

    #[serde(rename = "Split", default)]
    pub split: SplitConfig,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            debug_mode: false,
            render_batch_size: default_render_batch_size(),
            serial_sheet: SerialSheetConfig::default(),
            pdf417_sheet: Pdf417SheetConfig::default(),
            location_sheet: LocationSheetConfig::default(),
            pallet_sheet: PalletSheetConfig::default(),
            random_strings: RandomStringsConfig::default(),
            split: SplitConfig::default(),
        }
    }
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_render_batch_size() -> usize {
    100
}

/// CODE128 sheet built from the first column of a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSheetConfig {
    pub geometry: LayoutGeometry,
    pub preview_count: usize,
    pub scale: u32,
}

impl Default for SerialSheetConfig {
    fn default() -> Self {
        Self {
            geometry: LayoutGeometry::a4(3, 8, 60, 20, 10),
            preview_count: 15,
            scale: 2,
        }
    }
}

/// PDF417 sheet of grouped values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pdf417SheetConfig {
    pub geometry: LayoutGeometry,
    pub group_size: usize,
    pub base_template: String,
    pub part_number: String,
    pub qty_info: String,
    /// Caption printed under every symbol; empty for none.
    pub caption: String,
    pub preview_count: usize,
    pub scale: u32,
}

impl Default for Pdf417SheetConfig {
    fn default() -> Self {
        Self {
            geometry: LayoutGeometry::a4(2, 4, 80, 30, 10),
            group_size: 5,
            base_template: DEFAULT_PDF417_BASE.to_string(),
            part_number: String::new(),
            qty_info: String::new(),
            caption: String::new(),
            preview_count: 10,
            scale: 2,
        }
    }
}

/// Sequential location codes (`PREFIX001`, `PREFIX002`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSheetConfig {
    pub geometry: LayoutGeometry,
    pub prefix: String,
    pub count: usize,
    pub preview_count: usize,
    pub scale: u32,
}

impl Default for LocationSheetConfig {
    fn default() -> Self {
        Self {
            geometry: LayoutGeometry::a4(3, 6, 60, 20, 20),
            prefix: "LOC".to_string(),
            count: 30,
            preview_count: 20,
            scale: 2,
        }
    }
}

/// Zero-padded sequential pallet codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PalletSheetConfig {
    pub geometry: LayoutGeometry,
    pub prefix: String,
    pub count: usize,
    pub starting_number: u64,
    pub total_length: usize,
    pub preview_count: usize,
    pub scale: u32,
}

impl Default for PalletSheetConfig {
    fn default() -> Self {
        Self {
            geometry: LayoutGeometry::a4(3, 6, 60, 20, 20),
            prefix: "PLT".to_string(),
            count: 30,
            starting_number: 1,
            total_length: 10,
            preview_count: 20,
            scale: 2,
        }
    }
}

/// Output format for tabular artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabularFormat {
    Csv,
    #[default]
    Xlsx,
}

impl TabularFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Xlsx => "xlsx",
        }
    }
}

/// Random serial numbers with rotating box ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomStringsConfig {
    pub count: usize,
    pub box_id_interval: usize,
    pub box_id_prefix: String,
    pub box_id_digits: usize,
    pub preview_count: usize,
    pub format: TabularFormat,
}

impl Default for RandomStringsConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            box_id_interval: 10,
            box_id_prefix: "BOX".to_string(),
            box_id_digits: 10,
            preview_count: 20,
            format: TabularFormat::Xlsx,
        }
    }
}

/// Whether split files repeat the source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPlacement {
    #[default]
    Include,
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub rows_per_file: usize,
    pub header: HeaderPlacement,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            rows_per_file: 1000,
            header: HeaderPlacement::Include,
        }
    }
}

/// How headers of the second and later files are treated when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeHeaderMode {
    /// Every row of every file is kept.
    #[default]
    KeepAll,
    /// Only the first file keeps its first row.
    FirstFileOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub header: MergeHeaderMode,
}

/// Which cells make up a duplicate key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum DedupMode {
    #[default]
    AllColumns,
    SpecificColumns { columns: Vec<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffixPosition {
    #[default]
    Start,
    End,
}

/// Text added to one column in modify mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAffix {
    pub column: usize,
    pub text: String,
    #[serde(default)]
    pub position: AffixPosition,
}

/// Column edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColumnEdit {
    Modify {
        affixes: Vec<ColumnAffix>,
    },
    Concatenate {
        columns: Vec<usize>,
        #[serde(default)]
        separator: String,
        new_column_name: String,
    },
}

/// One tool run, read from a job file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum JobConfig {
    SerialSheet {
        input: Utf8PathBuf,
        #[serde(default)]
        config: Option<SerialSheetConfig>,
    },
    Pdf417Sheet {
        input: Utf8PathBuf,
        #[serde(default)]
        config: Option<Pdf417SheetConfig>,
    },
    LocationSheet {
        #[serde(default)]
        config: Option<LocationSheetConfig>,
    },
    PalletSheet {
        #[serde(default)]
        config: Option<PalletSheetConfig>,
    },
    RandomStrings {
        #[serde(default)]
        config: Option<RandomStringsConfig>,
    },
    Split {
        input: Utf8PathBuf,
        #[serde(default)]
        config: Option<SplitConfig>,
    },
    Merge {
        inputs: Vec<Utf8PathBuf>,
        #[serde(default)]
        config: MergeConfig,
    },
    Dedup {
        input: Utf8PathBuf,
        #[serde(default)]
        mode: DedupMode,
    },
    EditColumns {
        input: Utf8PathBuf,
        edit: ColumnEdit,
    },
}

/// The tools a session can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    SerialSheet,
    Pdf417Sheet,
    LocationSheet,
    PalletSheet,
    RandomStrings,
    Split,
    Merge,
    Dedup,
    EditColumns,
}

impl ToolKind {
    /// Short tool name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SerialSheet => "serial_sheet",
            ToolKind::Pdf417Sheet => "pdf417_sheet",
            ToolKind::LocationSheet => "location_sheet",
            ToolKind::PalletSheet => "pallet_sheet",
            ToolKind::RandomStrings => "random_strings",
            ToolKind::Split => "split",
            ToolKind::Merge => "merge",
            ToolKind::Dedup => "dedup",
            ToolKind::EditColumns => "edit_columns",
        }
    }
}

impl JobConfig {
    pub fn kind(&self) -> ToolKind {
        match self {
            JobConfig::SerialSheet { .. } => ToolKind::SerialSheet,
            JobConfig::Pdf417Sheet { .. } => ToolKind::Pdf417Sheet,
            JobConfig::LocationSheet { .. } => ToolKind::LocationSheet,
            JobConfig::PalletSheet { .. } => ToolKind::PalletSheet,
            JobConfig::RandomStrings { .. } => ToolKind::RandomStrings,
            JobConfig::Split { .. } => ToolKind::Split,
            JobConfig::Merge { .. } => ToolKind::Merge,
            JobConfig::Dedup { .. } => ToolKind::Dedup,
            JobConfig::EditColumns { .. } => ToolKind::EditColumns,
        }
    }
}
