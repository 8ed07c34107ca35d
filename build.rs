use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 한글을 포함한 CJK 글리프를 가진 폰트 파일 이름 키워드.
const FONT_KEYWORDS: [&str; 8] = [
    "nanum",
    "malgun",
    "applegothic",
    "pretendard",
    "notosanscjk",
    "notosanskr",
    "wqy",
    "pingfang",
];

/// Cargo 빌드 단계에서 UI에 쓸 폰트 스텁을 준비한다.
fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=build.rs");
    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        println!("cargo:warning=OUT_DIR가 없어 폰트 스텁을 만들지 않습니다.");
        return Ok(());
    };
    generate_font_stub(&out_dir.join("custom_font.rs"))
}

/// 사용 가능한 CJK 폰트를 탐색하여 egui에서 include_bytes! 할 수 있는 스텁을 만든다.
fn generate_font_stub(dest: &Path) -> std::io::Result<()> {
    let content = match locate_font_file() {
        Some(path) => {
            let escaped = path.to_string_lossy().replace('\\', "\\\\");
            format!(
                "pub fn embedded_font_bytes() -> Option<&'static [u8]> {{\n    Some(include_bytes!(\"{escaped}\"))\n}}\n"
            )
        }
        None => "pub fn embedded_font_bytes() -> Option<&'static [u8]> { None }\n".to_string(),
    };
    fs::write(dest, content)
}

/// 시스템 폰트 디렉터리에서 CJK 폰트를 찾는다.
fn locate_font_file() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from("/Library/Fonts"),
    ];
    if let Some(home) = env::var_os("HOME") {
        candidates.push(Path::new(&home).join(".fonts"));
        candidates.push(Path::new(&home).join(".local/share/fonts"));
    }
    if let Some(windir) = env::var_os("WINDIR") {
        candidates.push(Path::new(&windir).join("Fonts"));
    }
    for dir in candidates {
        if !dir.exists() {
            continue;
        }
        for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let lower = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|s| s.to_ascii_lowercase())
                .unwrap_or_default();
            if !FONT_KEYWORDS.iter().any(|k| lower.contains(k)) {
                continue;
            }
            // ttc 컬렉션은 egui가 첫 페이스만 읽는다.
            if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
                if matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc") {
                    println!("cargo:rerun-if-changed={}", path.display());
                    return Some(path);
                }
            }
        }
    }
    println!("cargo:warning=CJK 폰트를 찾지 못했습니다. egui 기본 폰트가 사용됩니다.");
    None
}
