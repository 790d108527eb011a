//! Grade Aggregator - 学业成绩汇总引擎
//!
//! 由成绩台账、出勤台账与评价目录计算学期平均与学年平均，
//! 以事务批处理的方式幂等写入。
//!
//! # 架构
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层（权重、评价、成绩、出勤、学期、汇总、报表）
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 精确小数与校验工具

pub mod config;
pub mod entity;
pub mod errors;
pub mod models;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
