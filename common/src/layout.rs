//! レイアウト設定モジュール
//!
//! レイアウト単位（px相当）基準のスライド定義（Source of Truth）
//! プレビュー・ラスタライズ・PDF配置はすべてここから導出する

// ============================================
// スライド寸法（レイアウト単位）
// ============================================

/// スライド幅（固定）
pub const SLIDE_WIDTH: f32 = 1120.0;
/// スライド高さ（16:9）
pub const SLIDE_HEIGHT: f32 = 630.0;

/// プレビュー領域の左右余白合計
pub const PREVIEW_PADDING: f32 = 96.0;

/// ヘッダー・フッター帯の高さ
pub const HEADER_HEIGHT: f32 = 64.0;
pub const FOOTER_HEIGHT: f32 = 38.0;

/// 本文の余白
pub const CONTENT_PADDING_X: f32 = 56.0;
pub const CONTENT_PADDING_Y: f32 = 40.0;
pub const PANEL_GAP: f32 = 40.0;

/// 写真パネル : 所見パネル = 3 : 2
pub const PHOTO_RATIO: f32 = 3.0 / 5.0;
pub const TEXT_RATIO: f32 = 2.0 / 5.0;

/// 表紙のアクセント帯（右側55%）
pub const COVER_ACCENT_RATIO: f32 = 0.55;
pub const COVER_PADDING_X: f32 = 96.0;
pub const COVER_PADDING_Y: f32 = 64.0;

// ============================================
// 出力設定
// ============================================

/// ラスタライズ倍率（2倍密度）
pub const RASTER_SCALE: f32 = 2.0;

/// JPEG品質 (0-100)
pub const JPEG_QUALITY: u8 = 95;

// ============================================
// 変換係数
// ============================================

/// px → pt変換 (96dpi基準)
pub const PX_TO_PT: f32 = 72.0 / 96.0;
pub const PT_TO_PX: f32 = 96.0 / 72.0;

/// PDFページサイズ（pt）
pub const PAGE_WIDTH_PT: f32 = SLIDE_WIDTH * PX_TO_PT; // 840pt
pub const PAGE_HEIGHT_PT: f32 = SLIDE_HEIGHT * PX_TO_PT; // 472.5pt

// ============================================
// 矩形
// ============================================

/// レイアウト単位の矩形（原点は左上）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// 倍率を掛けた矩形（ラスタ座標用）
    pub fn scaled(&self, scale: f32) -> Rect {
        Rect::new(
            self.x * scale,
            self.y * scale,
            self.width * scale,
            self.height * scale,
        )
    }

    /// 内側に余白を取った矩形
    pub fn inset(&self, amount: f32) -> Rect {
        Rect::new(
            self.x + amount,
            self.y + amount,
            (self.width - amount * 2.0).max(0.0),
            (self.height - amount * 2.0).max(0.0),
        )
    }

    /// 縦横比を保って内接させる（object-fit: contain）
    pub fn fit(&self, content_width: f32, content_height: f32) -> Rect {
        if content_width <= 0.0 || content_height <= 0.0 {
            return *self;
        }
        let scale = (self.width / content_width).min(self.height / content_height);
        let width = content_width * scale;
        let height = content_height * scale;
        Rect::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }
}

// ============================================
// スライド配置
// ============================================

/// スライド内の領域定義
#[derive(Debug, Clone)]
pub struct SlideGeometry {
    pub width: f32,
    pub height: f32,
}

impl Default for SlideGeometry {
    fn default() -> Self {
        Self {
            width: SLIDE_WIDTH,
            height: SLIDE_HEIGHT,
        }
    }
}

impl SlideGeometry {
    pub fn full(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// 走行ヘッダー（指摘スライドのみ）
    pub fn header(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, HEADER_HEIGHT)
    }

    /// フッター（ページ番号）
    pub fn footer(&self) -> Rect {
        Rect::new(0.0, self.height - FOOTER_HEIGHT, self.width, FOOTER_HEIGHT)
    }

    /// ヘッダー・フッターを除いた本文領域
    pub fn content(&self) -> Rect {
        Rect::new(
            CONTENT_PADDING_X,
            HEADER_HEIGHT + CONTENT_PADDING_Y,
            self.width - CONTENT_PADDING_X * 2.0,
            self.height - HEADER_HEIGHT - FOOTER_HEIGHT - CONTENT_PADDING_Y * 2.0,
        )
    }

    /// 写真パネル（左 3/5）
    pub fn photo_panel(&self) -> Rect {
        let content = self.content();
        let usable = content.width - PANEL_GAP;
        Rect::new(content.x, content.y, usable * PHOTO_RATIO, content.height)
    }

    /// 所見パネル（右 2/5）
    pub fn text_panel(&self) -> Rect {
        let content = self.content();
        let usable = content.width - PANEL_GAP;
        let photo = self.photo_panel();
        Rect::new(
            photo.right() + PANEL_GAP,
            content.y,
            usable * TEXT_RATIO,
            content.height,
        )
    }

    /// 表紙アクセント帯
    pub fn cover_accent(&self) -> Rect {
        let width = self.width * COVER_ACCENT_RATIO;
        Rect::new(self.width - width, 0.0, width, self.height)
    }

    /// 表紙の文字領域
    pub fn cover_text(&self) -> Rect {
        Rect::new(
            COVER_PADDING_X,
            COVER_PADDING_Y,
            self.width * (1.0 - COVER_ACCENT_RATIO) - COVER_PADDING_X,
            self.height - COVER_PADDING_Y * 2.0,
        )
    }
}

// ============================================
// ヘルパー関数
// ============================================

/// プレビュー倍率: min(1, (W - padding) / 1120)、負にならない
pub fn preview_scale(container_width: f32, padding: f32) -> f32 {
    let available = container_width - padding;
    if !available.is_finite() || available <= 0.0 {
        return 0.0;
    }
    (available / SLIDE_WIDTH).min(1.0)
}

/// px → pt 変換
#[inline]
pub fn px_to_pt(px: f32) -> f32 {
    px * PX_TO_PT
}

/// pt → px 変換
#[inline]
pub fn pt_to_px(pt: f32) -> f32 {
    pt * PT_TO_PX
}
