//! 關卡、項目與頭像的靜態目錄
//!
//! 使用聲明式 `*_DEFS` 表定義所有目錄資料。目錄在啟動時即固定，
//! 核心絕不修改它。

// ============================================================================
// 項目與關卡定義
// ============================================================================

/// 卡牌項目定義（一個主題條目，每副牌產生兩張卡）
#[derive(Clone, Copy, Debug)]
pub struct ItemDef {
    pub index: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub image_ref: &'static str,
    pub icon_glyph: &'static str,
}

/// 關卡定義
#[derive(Clone, Copy, Debug)]
pub struct StageDef {
    pub id: u32,
    pub name: &'static str,
    pub unlock_order: u32,
    pub items: &'static [ItemDef],
}

/// 第一關：韓國文化
static STAGE_1_ITEMS: [ItemDef; 8] = [
    ItemDef { index: 0, title: "한복", description: "한국의 전통 의상으로 특별한 날에 입습니다.", image_ref: "hanbok.jpg", icon_glyph: "👘" },
    ItemDef { index: 1, title: "김치", description: "한국의 대표적인 발효 음식입니다.", image_ref: "kimchi.jpg", icon_glyph: "🌶️" },
    ItemDef { index: 2, title: "비빔밥", description: "밥 위에 나물을 얹어 비벼 먹는 음식입니다.", image_ref: "bibimbap.jpg", icon_glyph: "🍚" },
    ItemDef { index: 3, title: "탈춤", description: "탈을 쓰고 추는 전통 연희입니다.", image_ref: "talchum.jpg", icon_glyph: "🎭" },
    ItemDef { index: 4, title: "태극기", description: "대한민국의 국기입니다.", image_ref: "taegeukgi.jpg", icon_glyph: "🇰🇷" },
    ItemDef { index: 5, title: "궁궐", description: "조선 시대 왕이 살던 큰 건축물입니다.", image_ref: "palace.jpg", icon_glyph: "🏯" },
    ItemDef { index: 6, title: "붓글씨", description: "붓으로 쓰는 서예입니다.", image_ref: "calligraphy.jpg", icon_glyph: "🖋️" },
    ItemDef { index: 7, title: "가야금", description: "한국의 전통 현악기입니다.", image_ref: "gayageum.jpg", icon_glyph: "🎶" },
];

/// 第二關：韓國飲食
static STAGE_2_ITEMS: [ItemDef; 8] = [
    ItemDef { index: 0, title: "불고기", description: "얇게 썬 고기를 양념해 구운 음식입니다.", image_ref: "bulgogi.jpg", icon_glyph: "🥩" },
    ItemDef { index: 1, title: "떡볶이", description: "떡을 매콤한 양념에 볶은 길거리 음식입니다.", image_ref: "tteokbokki.jpg", icon_glyph: "🍢" },
    ItemDef { index: 2, title: "잡채", description: "당면과 채소를 볶아 만든 잔치 음식입니다.", image_ref: "japchae.jpg", icon_glyph: "🍜" },
    ItemDef { index: 3, title: "삼계탕", description: "닭에 인삼을 넣고 끓인 보양식입니다.", image_ref: "samgyetang.jpg", icon_glyph: "🍲" },
    ItemDef { index: 4, title: "냉면", description: "차가운 육수에 말아 먹는 국수입니다.", image_ref: "naengmyeon.jpg", icon_glyph: "❄️" },
    ItemDef { index: 5, title: "호떡", description: "설탕을 넣어 구운 겨울 간식입니다.", image_ref: "hotteok.jpg", icon_glyph: "🥞" },
    ItemDef { index: 6, title: "갈비", description: "양념한 갈비를 구워 먹는 음식입니다.", image_ref: "galbi.jpg", icon_glyph: "🍖" },
    ItemDef { index: 7, title: "식혜", description: "밥알이 동동 뜨는 달콤한 전통 음료입니다.", image_ref: "sikhye.jpg", icon_glyph: "🥛" },
];

/// 第三關：韓國民俗遊戲
static STAGE_3_ITEMS: [ItemDef; 8] = [
    ItemDef { index: 0, title: "윷놀이", description: "윷가락을 던져 말을 움직이는 명절 놀이입니다.", image_ref: "yutnori.jpg", icon_glyph: "🎲" },
    ItemDef { index: 1, title: "연날리기", description: "바람을 타고 연을 하늘에 띄우는 놀이입니다.", image_ref: "yeonnalligi.jpg", icon_glyph: "🪁" },
    ItemDef { index: 2, title: "제기차기", description: "제기를 발로 차서 떨어뜨리지 않는 놀이입니다.", image_ref: "jegichagi.jpg", icon_glyph: "🪶" },
    ItemDef { index: 3, title: "팽이치기", description: "팽이를 돌려 오래 돌게 하는 놀이입니다.", image_ref: "paengichigi.jpg", icon_glyph: "🪀" },
    ItemDef { index: 4, title: "투호", description: "항아리에 화살을 던져 넣는 전통 놀이입니다.", image_ref: "tuho.jpg", icon_glyph: "🏹" },
    ItemDef { index: 5, title: "씨름", description: "샅바를 잡고 힘을 겨루는 한국 전통 씨름입니다.", image_ref: "ssireum.jpg", icon_glyph: "🤼" },
    ItemDef { index: 6, title: "강강술래", description: "손을 잡고 원을 그리며 추는 춤입니다.", image_ref: "ganggangsullae.jpg", icon_glyph: "💃" },
    ItemDef { index: 7, title: "줄다리기", description: "두 편이 줄을 당겨 승부를 가리는 놀이입니다.", image_ref: "juldarigi.jpg", icon_glyph: "🪢" },
];

/// 關卡定義表（unlock_order 與表內順序一致）
pub static STAGE_DEFS: [StageDef; 3] = [
    StageDef { id: 1, name: "한국 문화", unlock_order: 1, items: &STAGE_1_ITEMS },
    StageDef { id: 2, name: "한국 음식", unlock_order: 2, items: &STAGE_2_ITEMS },
    StageDef { id: 3, name: "한국 놀이", unlock_order: 3, items: &STAGE_3_ITEMS },
];

// ============================================================================
// 頭像商店定義
// ============================================================================

/// 頭像分類（定價分層）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvatarCategory {
    Free,
    Basic,
    Premium,
    Legendary,
}

impl AvatarCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarCategory::Free => "free",
            AvatarCategory::Basic => "basic",
            AvatarCategory::Premium => "premium",
            AvatarCategory::Legendary => "legendary",
        }
    }
}

/// 頭像定義
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvatarDef {
    pub id: &'static str,
    pub name: &'static str,
    pub price: i64,
    pub category: AvatarCategory,
}

/// 免費預設頭像，新進度記錄一律持有
pub const DEFAULT_AVATAR_ID: &str = "😊";

/// 頭像商店定義表
pub static AVATAR_DEFS: [AvatarDef; 13] = [
    AvatarDef { id: "😊", name: "기본", price: 0, category: AvatarCategory::Free },
    AvatarDef { id: "😎", name: "멋짐", price: 10, category: AvatarCategory::Basic },
    AvatarDef { id: "🥳", name: "파티", price: 10, category: AvatarCategory::Basic },
    AvatarDef { id: "🤓", name: "똑똑", price: 10, category: AvatarCategory::Basic },
    AvatarDef { id: "😇", name: "천사", price: 15, category: AvatarCategory::Basic },
    AvatarDef { id: "🤗", name: "포옹", price: 15, category: AvatarCategory::Basic },
    AvatarDef { id: "🥰", name: "사랑", price: 15, category: AvatarCategory::Basic },
    AvatarDef { id: "👑", name: "왕관", price: 50, category: AvatarCategory::Premium },
    AvatarDef { id: "🦄", name: "유니콘", price: 50, category: AvatarCategory::Premium },
    AvatarDef { id: "🐉", name: "드래곤", price: 50, category: AvatarCategory::Premium },
    AvatarDef { id: "💎", name: "다이아", price: 100, category: AvatarCategory::Legendary },
    AvatarDef { id: "🏆", name: "트로피", price: 100, category: AvatarCategory::Legendary },
    AvatarDef { id: "🚀", name: "로켓", price: 100, category: AvatarCategory::Legendary },
];

// ============================================================================
// 查詢輔助
// ============================================================================

pub fn stage_by_id(id: u32) -> Option<&'static StageDef> {
    STAGE_DEFS.iter().find(|s| s.id == id)
}

pub fn item_by_index(stage: &StageDef, index: u32) -> Option<&'static ItemDef> {
    stage.items.iter().find(|i| i.index == index)
}

pub fn avatar_by_id(id: &str) -> Option<&'static AvatarDef> {
    AVATAR_DEFS.iter().find(|a| a.id == id)
}

/// 目錄中最大的關卡 id（解鎖推進的上限）
pub fn max_stage_id() -> u32 {
    STAGE_DEFS.iter().map(|s| s.id).max().unwrap_or(0)
}

// ============================================================================
// 單元測試
// ============================================================================
