//! Keyword tables the extraction engine matches against.
//!
//! Everything here is plain data so a deployment (or a test) can swap in its own tables.
//! The built-in tables follow Korean school-document conventions.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Fine-grained subjects. Longer names must come before their prefixes.
    pub subcategories: Vec<String>,
    /// Broad subjects.
    pub categories: Vec<String>,
    /// Document-type words ("보고서", "세특", ...).
    pub document_types: Vec<String>,
    /// Document types that say nothing beyond "this is an exam paper".
    pub exam_artifacts: Vec<String>,
    /// Any of these means the national college entrance exam, held in November.
    pub national_exam: Vec<String>,
    /// Named mock-exam cycles and their fixed months.
    pub mock_exam_months: Vec<(String, String)>,
    /// Half-year and quarter words and the month each maps to.
    pub period_months: Vec<(String, String)>,
    /// Subject sat in exam periods 1, 2, 3 ... (index 0 is period 1).
    pub exam_period_subjects: Vec<String>,
    /// Regexes for phrases whose substrings would otherwise read as subjects.
    pub noise_masks: Vec<String>,
    /// Words never used as a guessed label.
    pub stopwords: Vec<String>,
    /// Word-final morphemes marking documents, records, plans, forms and the like.
    pub suffixes: Vec<String>,
    /// Endings of verb forms rejected by the smart-keyword guesser.
    pub verb_endings: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            subcategories: strings(&[
                "생명과학Ⅱ", "생명과학Ⅰ", "지구과학Ⅱ", "지구과학Ⅰ", "물리학Ⅱ", "물리학Ⅰ",
                "화학Ⅱ", "화학Ⅰ", "생명과학", "지구과학", "물리학", "물리", "화학",
                "통합과학", "통합사회", "한국사", "동아시아사", "세계사", "한국지리",
                "세계지리", "생활과 윤리", "윤리와 사상", "정치와 법", "사회·문화",
                "미적분", "기하", "확률과 통계", "확통", "수학Ⅱ", "수학Ⅰ",
                "화법과 작문", "언어와 매체", "화작", "언매", "독서", "문학",
                "영어회화", "영작문", "일본어", "중국어",
            ]),
            categories: strings(&[
                "국어", "수학", "영어", "과학", "사회", "탐구", "역사", "도덕", "기술·가정",
                "기가", "정보", "음악", "미술", "체육",
            ]),
            document_types: strings(&[
                "생기부", "과세특", "세특", "창의적체험", "창체", "자동봉진", "자율활동",
                "동아리", "봉사활동", "진로활동", "행동특성", "행특", "행발", "독서활동",
                "수상경력", "보고서", "계획서", "신청서", "평가서", "회의록", "상담록",
                "시험지", "문제지", "해설지", "정답지", "평가문제", "정답", "수행평가",
                "중간고사", "기말고사",
            ]),
            exam_artifacts: strings(&["문제지", "시험지", "평가문제", "정답지", "정답"]),
            national_exam: strings(&[
                "대학수학능력시험", "수학능력시험", "능력시험", "대수능", "수능특강", "수능완성",
                "수능", "CSAT",
            ]),
            mock_exam_months: pairs(&[
                ("3월 학력평가", "03"),
                ("3월 모의고사", "03"),
                ("4월 학력평가", "04"),
                ("4월 모의고사", "04"),
                ("6월 모의평가", "06"),
                ("6월 모의고사", "06"),
                ("7월 학력평가", "07"),
                ("7월 모의고사", "07"),
                ("9월 모의평가", "09"),
                ("9월 모의고사", "09"),
                ("10월 학력평가", "10"),
                ("10월 모의고사", "10"),
                ("11월 모의평가", "11"),
            ]),
            period_months: pairs(&[
                ("상반기", "06"),
                ("하반기", "12"),
                ("1/4분기", "03"),
                ("2/4분기", "06"),
                ("3/4분기", "09"),
                ("4/4분기", "12"),
                ("1분기", "03"),
                ("2분기", "06"),
                ("3분기", "09"),
                ("4분기", "12"),
            ]),
            exam_period_subjects: strings(&["국어", "수학", "영어"]),
            noise_masks: strings(&[
                r"대학\s*수학\s*능력\s*시험",
                r"수학\s*능력\s*시험",
                r"수학\s*능력\s*평가",
                r"과학\s*기술",
                r"사회\s*과학",
                r"자연\s*과학",
                r"한국\s*교육\s*과정",
                r"교육\s*과정\s*평가\s*원",
            ]),
            stopwords: strings(&[
                "및", "의", "를", "을", "에", "가", "이", "은", "는", "로", "으로", "에서",
                "년", "월", "일", "제", "호", "차", "회", "분", "시", "때", "등", "중", "본",
                "당", "그", "이것", "저것", "것", "수", "것이", "위한", "대한", "관한", "안내",
                "문서", "파일", "자료", "작성", "담당", "내용", "후", "내", "외", "더", "덜",
                "학년도", "학년", "학기", "교시", "영역", "홀수형", "짝수형",
            ]),
            suffixes: strings(&["서", "록", "안", "지", "문", "표", "부"]),
            verb_endings: strings(&["하다", "되다", "입니다", "합니다", "있다", "없다"]),
        }
    }
}

impl Vocabulary {
    /// Reads a vocabulary from TOML. Tables missing from the file keep their built-in values.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let vocab: Vocabulary = toml::from_str(&content)?;
        Ok(vocab)
    }

    pub fn compile_noise_masks(&self) -> Result<Vec<Regex>> {
        self.noise_masks
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| Error::Pattern {
                    name: p.clone(),
                    source,
                })
            })
            .collect()
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.iter().any(|s| s == word)
    }

    pub fn is_exam_artifact(&self, doc_type: &str) -> bool {
        self.exam_artifacts.iter().any(|s| s == doc_type)
    }

    /// First fine subject contained in `text`.
    pub fn find_subcategory(&self, text: &str) -> Option<&str> {
        find_in(&self.subcategories, text)
    }

    pub fn find_category(&self, text: &str) -> Option<&str> {
        find_in(&self.categories, text)
    }

    pub fn find_document_type(&self, text: &str) -> Option<&str> {
        find_in(&self.document_types, text)
    }

    pub fn mentions_national_exam(&self, text: &str) -> bool {
        find_in(&self.national_exam, text).is_some()
    }
}

fn find_in<'a>(list: &'a [String], text: &str) -> Option<&'a str> {
    list.iter()
        .find(|k| !k.is_empty() && text.contains(k.as_str()))
        .map(String::as_str)
}
