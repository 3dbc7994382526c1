//! 題庫練習 (Tíkù Liànxí): practise a question bank in sequential, random,
//! mock-exam or review mode, keeping a per-bank record of missed questions.

pub mod libtiku;
