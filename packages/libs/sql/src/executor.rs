//! 실행기 인터페이스
//!
//! CRUD Facade와 Schema Reconciler는 구체적인 DB 드라이버 대신 이 trait만 사용합니다.
//! 실행기는 호출자가 소유하고 `&mut`로 빌려주므로, 한 실행기에서 동시에 진행되는 문은
//! 최대 하나입니다.

use async_trait::async_trait;

use crate::error::Result;
use crate::value::{Row, SqlValue};

/// SQL 실행기
#[async_trait]
pub trait Executor: Send {
    /// 위치 파라미터를 바인딩하여 실행
    ///
    /// 결과 행이 없는 문은 빈 목록을 반환합니다.
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

    /// 쓰기 확정
    ///
    /// 자동 커밋 연결이면 할 일이 없습니다.
    async fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

/// 기존 테이블 DDL 조회
#[async_trait]
pub trait SchemaIntrospector: Send {
    /// 사용자 테이블의 `CREATE TABLE` 텍스트 (내부 테이블 제외)
    async fn existing_table_ddl(&mut self) -> Result<Vec<String>>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! 실행 기록용 실행기

    use std::collections::VecDeque;

    use super::*;

    /// 실행된 (SQL, 파라미터)를 기록하고 미리 넣어둔 결과를 순서대로 돌려줍니다.
    #[derive(Debug, Default)]
    pub struct RecordingExecutor {
        pub executed: Vec<(String, Vec<SqlValue>)>,
        pub results: VecDeque<Vec<Row>>,
        pub commits: usize,
        pub existing: Vec<String>,
    }

    impl RecordingExecutor {
        pub fn with_results(results: Vec<Vec<Row>>) -> Self {
            Self {
                results: results.into(),
                ..Default::default()
            }
        }

        pub fn statements(&self) -> Vec<&str> {
            self.executed.iter().map(|(sql, _)| sql.as_str()).collect()
        }
    }

    #[async_trait]
    impl Executor for RecordingExecutor {
        async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
            self.executed.push((sql.to_string(), params.to_vec()));
            Ok(self.results.pop_front().unwrap_or_default())
        }

        async fn commit(&mut self) -> Result<()> {
            self.commits += 1;
            Ok(())
        }
    }

    #[async_trait]
    impl SchemaIntrospector for RecordingExecutor {
        async fn existing_table_ddl(&mut self) -> Result<Vec<String>> {
            Ok(self.existing.clone())
        }
    }
}
