use cpl_persistence_mysql::create_db_pool;

const TABLES: [(&str, &str); 7] = [
    (
        "tblCountries",
        "CREATE TABLE IF NOT EXISTS tblCountries ( \
            Id BIGINT AUTO_INCREMENT PRIMARY KEY, \
            Name VARCHAR(255) NOT NULL, \
            IsoCode2 CHAR(2) NOT NULL, \
            IsoCode3 CHAR(3) NOT NULL, \
            Capital VARCHAR(255) NULL, \
            PhoneCode VARCHAR(16) NULL, \
            Continent VARCHAR(64) NULL, \
            Void TINYINT(1) NOT NULL DEFAULT 0, \
            CreatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            UpdatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6))",
    ),
    (
        "tblPlayers",
        "CREATE TABLE IF NOT EXISTS tblPlayers ( \
            Id BIGINT AUTO_INCREMENT PRIMARY KEY, \
            FirstName VARCHAR(255) NOT NULL, \
            LastName VARCHAR(255) NOT NULL, \
            DateOfBirth DATE NULL, \
            AvatarUrl VARCHAR(512) NULL, \
            NationalityId BIGINT NULL, \
            Void TINYINT(1) NOT NULL DEFAULT 0, \
            CreatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            UpdatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6))",
    ),
    (
        "tblTeams",
        "CREATE TABLE IF NOT EXISTS tblTeams ( \
            Id BIGINT AUTO_INCREMENT PRIMARY KEY, \
            Name VARCHAR(255) NOT NULL, \
            Slogan VARCHAR(255) NULL, \
            LogoUrl VARCHAR(512) NULL, \
            Void TINYINT(1) NOT NULL DEFAULT 0, \
            CreatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            UpdatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6))",
    ),
    (
        "tblSeasons",
        "CREATE TABLE IF NOT EXISTS tblSeasons ( \
            Id BIGINT AUTO_INCREMENT PRIMARY KEY, \
            Name VARCHAR(255) NOT NULL, \
            StartDate DATE NULL, \
            EndDate DATE NULL, \
            LogoUrl VARCHAR(512) NULL, \
            Status INT NOT NULL DEFAULT 1, \
            Void TINYINT(1) NOT NULL DEFAULT 0, \
            CreatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            UpdatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6))",
    ),
    (
        "tblMatches",
        "CREATE TABLE IF NOT EXISTS tblMatches ( \
            Id BIGINT AUTO_INCREMENT PRIMARY KEY, \
            Team1 BIGINT NULL, \
            Team2 BIGINT NULL, \
            ScheduledDate DATE NOT NULL, \
            Duration INT NULL, \
            Extra INT NULL, \
            GoldenStrike TINYINT(1) NOT NULL DEFAULT 0, \
            Category INT NOT NULL, \
            Status INT NOT NULL DEFAULT 1, \
            `Order` INT NOT NULL, \
            SeasonId BIGINT NOT NULL, \
            NetPoints INT NULL, \
            Outcome INT NULL, \
            TossOutcome INT NULL, \
            Void TINYINT(1) NOT NULL DEFAULT 0, \
            CreatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            UpdatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6))",
    ),
    (
        "tblMatchStats",
        "CREATE TABLE IF NOT EXISTS tblMatchStats ( \
            MatchId BIGINT NOT NULL, \
            PlayerId BIGINT NOT NULL, \
            CoinsPocketed TINYINT UNSIGNED NOT NULL DEFAULT 0, \
            StrikersPocketed TINYINT UNSIGNED NOT NULL DEFAULT 0, \
            CoinsFined TINYINT UNSIGNED NOT NULL DEFAULT 0, \
            ShotsTaken TINYINT UNSIGNED NOT NULL DEFAULT 0, \
            Void TINYINT(1) NOT NULL DEFAULT 0, \
            CreatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            UpdatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            PRIMARY KEY (MatchId, PlayerId))",
    ),
    (
        "tblPlayersSeasonsTeams",
        "CREATE TABLE IF NOT EXISTS tblPlayersSeasonsTeams ( \
            Id BIGINT AUTO_INCREMENT PRIMARY KEY, \
            PlayerId BIGINT NOT NULL, \
            SeasonId BIGINT NOT NULL, \
            TeamId BIGINT NOT NULL, \
            Void TINYINT(1) NOT NULL DEFAULT 0, \
            CreatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6), \
            UpdatedAt DATETIME(6) NOT NULL DEFAULT CURRENT_TIMESTAMP(6))",
    ),
];

// The aggregation routines (usp_GetLeagueTable, usp_GetLifetimeHeadToHead,
// usp_AssignPlayerToTeam) are owned by the database deployment and are not
// created here.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let pool = create_db_pool().await;
    for (name, ddl) in TABLES {
        sqlx::query(ddl)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", name, e));
        println!("Created table {}", name);
    }
    pool.close().await;
}
