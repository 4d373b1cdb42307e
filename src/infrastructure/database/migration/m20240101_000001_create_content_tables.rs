//! Create the editorial content tables

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Localisations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Localisations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Localisations::LanguageCode).text().not_null())
                    .col(ColumnDef::new(Localisations::CountryCode).text().not_null())
                    .col(ColumnDef::new(Localisations::Image).text())
                    .col(ColumnDef::new(Localisations::ImageHost).text())
                    .col(ColumnDef::new(Localisations::LogoText).text())
                    .col(ColumnDef::new(Localisations::LogoDescription).text())
                    .to_owned(),
            )
            .await?;

        // Language + country pair acts as the locale identity
        manager
            .create_index(
                Index::create()
                    .name("idx_localisation_code_unique")
                    .table(Localisations::Table)
                    .col(Localisations::LanguageCode)
                    .col(Localisations::CountryCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Uuid).text().unique_key())
                    .col(ColumnDef::new(Categories::Title).text().not_null())
                    .col(ColumnDef::new(Categories::Subtitle).text())
                    .col(ColumnDef::new(Categories::Slug).text().not_null().unique_key())
                    .col(ColumnDef::new(Categories::LocalisationId).integer())
                    .col(ColumnDef::new(Categories::SourceId).integer())
                    .col(
                        ColumnDef::new(Categories::FeaturedInNavbar)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Categories::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Categories::Image).text())
                    .col(ColumnDef::new(Categories::ImageHost).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_localisation")
                            .from(Categories::Table, Categories::LocalisationId)
                            .to(Localisations::Table, Localisations::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_category_source")
                            .from(Categories::Table, Categories::SourceId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Posts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Posts::Uuid).text().unique_key())
                    .col(ColumnDef::new(Posts::Title).text().not_null())
                    .col(ColumnDef::new(Posts::Subtitle).text())
                    .col(ColumnDef::new(Posts::Slug).text().not_null().unique_key())
                    .col(ColumnDef::new(Posts::Description).text())
                    .col(ColumnDef::new(Posts::Content).text())
                    .col(ColumnDef::new(Posts::Created).timestamp().not_null())
                    .col(ColumnDef::new(Posts::Modified).timestamp().not_null())
                    .col(ColumnDef::new(Posts::OwnerName).text())
                    .col(ColumnDef::new(Posts::OwnerEmail).text())
                    .col(ColumnDef::new(Posts::PrimaryCategoryId).integer())
                    .col(ColumnDef::new(Posts::SourceId).integer())
                    .col(ColumnDef::new(Posts::LocalisationId).integer())
                    .col(
                        ColumnDef::new(Posts::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Posts::Featured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Posts::FeaturedInCategory)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Posts::Image).text())
                    .col(ColumnDef::new(Posts::ImageHost).text())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_primary_category")
                            .from(Posts::Table, Posts::PrimaryCategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_source")
                            .from(Posts::Table, Posts::SourceId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_localisation")
                            .from(Posts::Table, Posts::LocalisationId)
                            .to(Localisations::Table, Localisations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_position")
                    .table(Posts::Table)
                    .col(Posts::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RelatedPosts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RelatedPosts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RelatedPosts::FromPostId).integer().not_null())
                    .col(ColumnDef::new(RelatedPosts::ToPostId).integer().not_null())
                    .col(
                        ColumnDef::new(RelatedPosts::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_related_from_post")
                            .from(RelatedPosts::Table, RelatedPosts::FromPostId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_related_to_post")
                            .from(RelatedPosts::Table, RelatedPosts::ToPostId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // The relation is asymmetric but a pair may only be linked once
        manager
            .create_index(
                Index::create()
                    .name("idx_related_pair_unique")
                    .table(RelatedPosts::Table)
                    .col(RelatedPosts::FromPostId)
                    .col(RelatedPosts::ToPostId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PostTags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PostTags::PostId).integer().not_null())
                    .col(ColumnDef::new(PostTags::Tag).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tag_post")
                            .from(PostTags::Table, PostTags::PostId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContentRepositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContentRepositories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContentRepositories::Name).text().not_null())
                    .col(ColumnDef::new(ContentRepositories::License).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PublishingTargets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PublishingTargets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PublishingTargets::RepositoryId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PublishingTargets::Name).text().not_null())
                    .col(ColumnDef::new(PublishingTargets::Url).text().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_target_repository")
                            .from(PublishingTargets::Table, PublishingTargets::RepositoryId)
                            .to(ContentRepositories::Table, ContentRepositories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PublishingTargets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ContentRepositories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RelatedPosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Localisations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Localisations {
    Table,
    Id,
    LanguageCode,
    CountryCode,
    Image,
    ImageHost,
    LogoText,
    LogoDescription,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Uuid,
    Title,
    Subtitle,
    Slug,
    LocalisationId,
    SourceId,
    FeaturedInNavbar,
    Position,
    Image,
    ImageHost,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Uuid,
    Title,
    Subtitle,
    Slug,
    Description,
    Content,
    Created,
    Modified,
    OwnerName,
    OwnerEmail,
    PrimaryCategoryId,
    SourceId,
    LocalisationId,
    Position,
    Featured,
    FeaturedInCategory,
    Image,
    ImageHost,
}

#[derive(DeriveIden)]
enum RelatedPosts {
    Table,
    Id,
    FromPostId,
    ToPostId,
    Position,
}

#[derive(DeriveIden)]
enum PostTags {
    Table,
    Id,
    PostId,
    Tag,
}

#[derive(DeriveIden)]
enum ContentRepositories {
    Table,
    Id,
    Name,
    License,
}

#[derive(DeriveIden)]
enum PublishingTargets {
    Table,
    Id,
    RepositoryId,
    Name,
    Url,
}
