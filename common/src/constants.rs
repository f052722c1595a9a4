//! 選択肢リスト（施設名・検査員名）
//!
//! 入力補助用。メタデータ側は任意の文字列を受け付ける。

/// 施設（薬局）一覧
pub const PHARMACY_LOCATIONS: &[&str] = &[
    "Albustan Compound Pharmacy",
    "Digital City Pharmacy",
    "Diplomatic Main Pharmacy",
    "KAFD 212 Pharmacy",
    "KAFD 309 Pharmacy",
    "Fayha Main Pharmacy",
    "Fayha ER Pharmacy",
    "Fayha First Floor Pharmacy",
    "Ghadeer Main Pharmacy",
    "Hamra Main Pharmacy",
    "Hamra ER Pharmacy",
    "Khobar Main Pharmacy",
    "Khobar ER Pharmacy",
    "Khobar First Floor Pharmacy",
    "Khobar Medical Center Pharmacy",
    "Kharj Main Pharmacy",
    "Kharj ER Pharmacy",
    "KKIA T3 Pharmacy",
    "Mohammadiyah Main Pharmacy",
    "Mohammadiyah ER Pharmacy",
    "Mohammadiyah First Floor Pharmacy",
    "Narjis Main Pharmacy",
    "Olaya Derma Pharmacy",
    "Olaya Main Pharmacy",
    "Olaya Neurology Pharmacy",
    "OSSH Main Pharmacy",
    "Qassim Main Pharmacy",
    "Qassim Expansion Pharmacy",
    "Qassim Street Pharmacy",
    "Buraydah Polyclinic Pharmacy",
    "Rabigh Pharmacy",
    "Rayan Main Pharmacy",
    "Rayan ER Pharmacy",
    "Rayan ObGyn Pharmacy",
    "Rayan Street Pharmacy",
    "Sewedi Main Pharmacy",
    "Sewedi ER Pharmacy",
    "Hamza Street Pharmacy",
    "Sahafa Main Pharmacy",
    "Sahafa ER Pharmacy",
    "Sahafa First Floor Pharmacy",
    "Takhassussi Main Pharmacy",
    "Plastic Surgery Pharmacy",
    "Takhassussi Basement Pharmacy",
    "Takhassussi OB Pharmacy",
];

/// 検査員一覧
pub const INSPECTORS: &[&str] = &[
    "Ahmad Abu Alreesh",
    "Ahmad Hammam Attia",
    "Salman Othman",
];
