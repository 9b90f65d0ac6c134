/// GO 命名空间枚举
///
/// 远程服务以数字标识三个固定的命名空间，运行期不会扩展
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Namespace {
    /// 生物过程
    BiologicalProcess = 1,
    /// 细胞组分
    CellularComponent = 2,
    /// 分子功能
    MolecularFunction = 3,
}

impl Namespace {
    /// 获取远程服务期望的命名空间代码
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 获取标签（用于文件名和日志）
    pub fn label(self) -> &'static str {
        match self {
            Namespace::BiologicalProcess => "BP",
            Namespace::CellularComponent => "CC",
            Namespace::MolecularFunction => "MF",
        }
    }

    /// 获取中文名称
    pub fn name(self) -> &'static str {
        match self {
            Namespace::BiologicalProcess => "生物过程",
            Namespace::CellularComponent => "细胞组分",
            Namespace::MolecularFunction => "分子功能",
        }
    }

    /// 获取条形图使用的固定颜色
    pub fn color(self) -> &'static str {
        match self {
            Namespace::BiologicalProcess => "skyblue",
            Namespace::CellularComponent => "lightgreen",
            Namespace::MolecularFunction => "lightcoral",
        }
    }

    /// 从代码解析命名空间
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Namespace::BiologicalProcess),
            2 => Some(Namespace::CellularComponent),
            3 => Some(Namespace::MolecularFunction),
            _ => None,
        }
    }

    /// 从标签解析命名空间
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "BP" => Some(Namespace::BiologicalProcess),
            "CC" => Some(Namespace::CellularComponent),
            "MF" => Some(Namespace::MolecularFunction),
            _ => None,
        }
    }

    /// 全部命名空间（每个输入文件扇出的固定集合）
    pub fn all() -> [Namespace; 3] {
        [
            Namespace::BiologicalProcess,
            Namespace::CellularComponent,
            Namespace::MolecularFunction,
        ]
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
