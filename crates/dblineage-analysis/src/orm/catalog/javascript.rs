//! Prisma, Sequelize, TypeORM, Knex and Drizzle.

use dblineage_core::types::Language;

use super::*;

pub(super) static DESCRIPTORS: &[DescriptorDef] = &[
    DescriptorDef {
        name: "Prisma",
        language: Language::TypeScript,
        file_indicators: &[
            r#"from\s+['"]@prisma/client['"]"#,
            r"PrismaClient",
            r"prisma\.\w+\.(findMany|findUnique|findFirst|create|update|delete|upsert|aggregate|groupBy|count)",
        ],
        usage: &[
            usage(r"prisma\.\w+\.create|prisma\.\w+\.createMany", WRITE, "Prisma create"),
            usage(
                r"prisma\.\w+\.update|prisma\.\w+\.updateMany|prisma\.\w+\.upsert",
                UPDATE,
                "Prisma update",
            ),
            usage(r"prisma\.\w+\.delete|prisma\.\w+\.deleteMany", DELETE, "Prisma delete"),
            usage(r"include\s*:\s*\{", JOIN, "Prisma include (relation join)"),
            usage(r"where\s*:\s*\{", FILTER, "Prisma where"),
            usage(r"select\s*:\s*\{", PROJECTION, "Prisma select"),
            usage(
                r"prisma\.\w+\.findMany|prisma\.\w+\.findFirst|prisma\.\w+\.findUnique",
                READ,
                "Prisma read query",
            ),
            usage(r"orderBy\s*:\s*\{", READ, "Prisma orderBy"),
        ],
        models: &[
            model(r"model\s+(\w+)\s*\{", 1, "Prisma model definition"),
            model(r#"@@map\(["'](\w+)["']\)"#, 1, "Prisma model-to-table mapping"),
        ],
        fields: &[field(
            r#"(\w+)\s+\w+.*@map\(["'](\w+)["']\)"#,
            1,
            2,
            "Prisma field-to-column mapping",
        )],
    },
    DescriptorDef {
        name: "Sequelize",
        language: Language::JavaScript,
        file_indicators: &[
            r#"require\s*\(\s*['"]sequelize['"]\s*\)"#,
            r#"from\s+['"]sequelize['"]"#,
            r"sequelize\.define",
            r"Model\.init\s*\(",
        ],
        usage: &[
            usage(r"\.create\s*\(|\.bulkCreate\s*\(", WRITE, "Sequelize create"),
            usage(r"\.update\s*\(|\.save\s*\(", UPDATE, "Sequelize update"),
            usage(r"\.destroy\s*\(", DELETE, "Sequelize destroy"),
            usage(r"include\s*:\s*\[", JOIN, "Sequelize include (join)"),
            usage(r"where\s*:\s*\{", FILTER, "Sequelize where"),
            usage(r"attributes\s*:\s*\[", PROJECTION, "Sequelize select attributes"),
            usage(
                r"\.findAll\s*\(|\.findOne\s*\(|\.findByPk\s*\(|\.findAndCountAll\s*\(",
                READ,
                "Sequelize find",
            ),
        ],
        models: &[
            model(r#"sequelize\.define\s*\(\s*['"](\w+)['"]"#, 1, "Sequelize model define"),
            model(r#"tableName\s*:\s*['"](\w+)['"]"#, 1, "Sequelize tableName"),
        ],
        fields: &[field(
            r#"(\w+)\s*:\s*\{\s*type\s*:.*field\s*:\s*['"](\w+)['"]"#,
            1,
            2,
            "Sequelize field mapping",
        )],
    },
    DescriptorDef {
        name: "TypeORM",
        language: Language::TypeScript,
        file_indicators: &[
            r#"from\s+['"]typeorm['"]"#,
            r"@Entity\s*\(",
            r"@Column\s*\(",
            r"getRepository\s*\(",
            r"createQueryBuilder\s*\(",
        ],
        usage: &[
            usage(
                r"@(Column|PrimaryGeneratedColumn|PrimaryColumn)\s*\(",
                DEFINITION,
                "TypeORM column declaration",
            ),
            usage(r"\.save\s*\(|\.insert\s*\(", WRITE, "TypeORM save/insert"),
            usage(r"\.update\s*\(|\.merge\s*\(", UPDATE, "TypeORM update"),
            usage(r"\.delete\s*\(|\.remove\s*\(|\.softDelete\s*\(", DELETE, "TypeORM delete"),
            usage(
                r"\.leftJoin|\.innerJoin|\.leftJoinAndSelect|\.innerJoinAndSelect",
                JOIN,
                "TypeORM join",
            ),
            usage(r"\.where\s*\(|\.andWhere\s*\(|\.orWhere\s*\(", FILTER, "TypeORM where"),
            usage(r"\.select\s*\(|addSelect\s*\(", PROJECTION, "TypeORM select"),
            usage(
                r"\.find\s*\(|\.findOne\s*\(|\.findOneBy\s*\(|\.findBy\s*\(",
                READ,
                "TypeORM find",
            ),
            usage(r"createQueryBuilder", READ, "TypeORM query builder"),
        ],
        models: &[
            model(r#"@Entity\s*\(\s*['"](\w+)['"]"#, 1, "TypeORM entity table name"),
            model(
                r#"@Entity\s*\(\s*\{[^}]*name\s*:\s*['"](\w+)['"]"#,
                1,
                "TypeORM entity name option",
            ),
        ],
        fields: &[
            field(
                r#"@Column\s*\(\s*\{[^}]*name\s*:\s*['"](\w+)['"][^}]*\}\s*\)\s*(\w+)"#,
                2,
                1,
                "TypeORM column mapping",
            ),
            field(r"@Column\s*\([^)]*\)\s*(\w+)", 1, 1, "TypeORM column (same name)"),
        ],
    },
    DescriptorDef {
        name: "Knex",
        language: Language::JavaScript,
        file_indicators: &[
            r#"require\s*\(\s*['"]knex['"]\s*\)"#,
            r#"from\s+['"]knex['"]"#,
            r#"knex\s*\(\s*['"]"#,
        ],
        usage: &[
            usage(r"\.insert\s*\(", WRITE, "Knex insert"),
            usage(r"\.update\s*\(", UPDATE, "Knex update"),
            usage(r"\.del\s*\(|\.delete\s*\(", DELETE, "Knex delete"),
            usage(r"\.join\s*\(|\.leftJoin\s*\(|\.innerJoin\s*\(", JOIN, "Knex join"),
            usage(r"\.where\s*\(|\.andWhere\s*\(|\.orWhere\s*\(", FILTER, "Knex where"),
            usage(r"\.select\s*\(", PROJECTION, "Knex select"),
            usage(r#"knex\s*\(\s*['"]"#, READ, "Knex query"),
        ],
        models: &[],
        fields: &[],
    },
    DescriptorDef {
        name: "Drizzle",
        language: Language::TypeScript,
        file_indicators: &[
            r#"from\s+['"]drizzle-orm"#,
            r"pgTable\s*\(",
            r"mysqlTable\s*\(",
            r"sqliteTable\s*\(",
        ],
        usage: &[
            usage(r"db\.insert\s*\(", WRITE, "Drizzle insert"),
            usage(r"db\.update\s*\(", UPDATE, "Drizzle update"),
            usage(r"db\.delete\s*\(", DELETE, "Drizzle delete"),
            usage(
                r"\.innerJoin\s*\(|\.leftJoin\s*\(|\.rightJoin\s*\(|with\s*:\s*\{",
                JOIN,
                "Drizzle join",
            ),
            usage(r"\.where\s*\(|\beq\s*\(|\band\s*\(|\bor\s*\(", FILTER, "Drizzle where"),
            usage(r"\.columns\s*\(|\.fields\s*\(", PROJECTION, "Drizzle projection"),
            usage(
                r"db\.select\s*\(|db\.query\.\w+\.findMany|db\.query\.\w+\.findFirst",
                READ,
                "Drizzle select/query",
            ),
        ],
        models: &[model(
            r#"(?:pgTable|mysqlTable|sqliteTable)\s*\(\s*['"](\w+)['"]"#,
            1,
            "Drizzle table definition",
        )],
        fields: &[field(
            r"(\w+)\s*:\s*(?:varchar|text|integer|serial|boolean|timestamp|uuid|numeric|real|bigint|smallint|json|jsonb)\s*\(",
            1,
            1,
            "Drizzle field definition",
        )],
    },
];
