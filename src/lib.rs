//! # 商品实时搜索
//!
//! - `app`: `GET /api/search` 路由、处理器与业务服务
//! - `client`: 输入防抖、条件请求、渲染状态
//! - `core`: 错误处理与中间件
//! - `infrastructure`: 配置、日志、数据库

pub mod app;
pub mod client;
pub mod core;
pub mod infrastructure;
